pub mod rewriter;

pub use rewriter::{ManifestLine, RELAY_PATH, relay_url, rewrite_manifest};

/// MIME type served for rewritten playlists.
pub const MANIFEST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

/// Whether an upstream `Content-Type` marks an HLS playlist.
///
/// Covers `application/vnd.apple.mpegurl`, `application/x-mpegURL` and
/// `audio/mpegurl`.
pub fn is_manifest_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("mpegurl")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_manifest_content_types() {
        assert!(is_manifest_content_type("application/vnd.apple.mpegurl"));
        assert!(is_manifest_content_type("application/x-mpegURL; charset=utf-8"));
        assert!(is_manifest_content_type("audio/mpegurl"));
        assert!(!is_manifest_content_type("video/mp2t"));
        assert!(!is_manifest_content_type("application/octet-stream"));
    }
}
