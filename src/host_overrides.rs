//! Per-host outbound header overrides.
//!
//! Some origins reject requests that do not look like they came from their
//! own player page. For those hosts the relay forges `Referer`/`Origin`.
//! The table is compiled in and read-only after startup.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;

/// Compiled-in override table: hostname -> extra headers.
const BUILTIN: &[(&str, &[(&str, &str)])] = &[
    (
        "190.92.10.66",
        &[
            ("referer", "https://190.92.10.66/"),
            ("origin", "https://190.92.10.66"),
        ],
    ),
    ("135.125.109.73", &[("referer", "http://135.125.109.73/")]),
    ("148.113.207.98", &[("referer", "http://148.113.207.98/")]),
];

/// Read-only mapping from exact hostname to additional request headers.
#[derive(Clone, Debug, Default)]
pub struct HostOverrides {
    hosts: HashMap<String, HeaderMap>,
}

impl HostOverrides {
    /// The override table shipped with the relay.
    pub fn builtin() -> Self {
        let mut overrides = Self::default();
        for (host, headers) in BUILTIN {
            let map = headers
                .iter()
                .map(|(name, value)| {
                    (
                        HeaderName::from_static(*name),
                        HeaderValue::from_static(*value),
                    )
                })
                .collect();
            overrides.hosts.insert((*host).to_string(), map);
        }
        overrides
    }

    /// Add (or replace) the headers for one host.
    pub fn with_host(mut self, host: impl Into<String>, headers: HeaderMap) -> Self {
        self.hosts.insert(host.into(), headers);
        self
    }

    /// Exact-match lookup. `None` means default headers only.
    pub fn lookup(&self, host: &str) -> Option<&HeaderMap> {
        self.hosts.get(host)
    }

    pub fn contains(&self, host: &str) -> bool {
        self.hosts.contains_key(host)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
