//! Same-origin relay for live HLS streams.
//!
//! `GET /api/proxy?url=<target>` fetches the target from its origin with
//! browser-like headers. Playlists come back rewritten so every segment and
//! variant reference points at the relay again; segments and other binary
//! content are streamed through with range headers preserved.

pub mod catalog;
pub mod classify;
pub mod config;
pub mod error;
pub mod hls;
pub mod host_overrides;
pub mod metrics;
pub mod server;
pub mod upstream;
