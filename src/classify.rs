//! Target URL classification.
//!
//! Turns the raw `url` query parameter into a validated [`ProxyRequest`] and
//! decides what kind of resource it points at. No network access happens
//! here.

use crate::error::RelayError;
use axum::http::{HeaderMap, HeaderValue};
use std::fmt;
use url::{Url, form_urlencoded};

/// Name of the query parameter carrying the target URL.
pub const URL_PARAM: &str = "url";

/// What the target URL points at, judged from its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// An HLS playlist (`.m3u8`)
    Manifest,
    /// A media chunk or sidecar (`.ts`, `.aac`, `.m4s`, `.mp4`, `.vtt`)
    Segment,
    /// Anything else; forwarded byte-for-byte
    Opaque,
}

impl ResourceKind {
    pub fn from_url(url: &Url) -> Self {
        let path = url.path().to_ascii_lowercase();
        if path.ends_with(".m3u8") {
            ResourceKind::Manifest
        } else if [".ts", ".aac", ".m4s", ".mp4", ".vtt"]
            .iter()
            .any(|ext| path.ends_with(ext))
        {
            ResourceKind::Segment
        } else {
            ResourceKind::Opaque
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Manifest => "manifest",
            ResourceKind::Segment => "segment",
            ResourceKind::Opaque => "opaque",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated relay request, ready for the upstream fetcher.
#[derive(Debug, Clone)]
pub struct ProxyRequest<'a> {
    pub target: Url,
    pub kind: ResourceKind,
    /// Inbound `Range` header, forwarded verbatim
    pub range: Option<HeaderValue>,
    /// Host-specific headers merged over the defaults
    pub overrides: Option<&'a HeaderMap>,
}

impl ProxyRequest<'_> {
    /// `host` + `path` of the target, for logs. Never includes the query.
    pub fn log_target(&self) -> String {
        format!(
            "{}{}",
            self.target.host_str().unwrap_or_default(),
            self.target.path()
        )
    }
}

/// Extract the `url` parameter from a raw query string.
///
/// Uses form-urlencoded rules, which never fail. An empty value counts as
/// missing.
pub fn url_param(query: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == URL_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Percent-decode once more; on failure keep the input as-is.
///
/// Callers commonly encode the target with `encodeURIComponent`, and some
/// double-encode it. Already-decoded input passes through unchanged.
pub fn decode_target(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

/// Parse and validate an absolute http(s) target URL.
///
/// # Errors
/// Returns [`RelayError::InvalidUrl`] for relative URLs, unsupported schemes,
/// or URLs without a host.
pub fn parse_target(target: &str) -> Result<Url, RelayError> {
    let parsed =
        Url::parse(target).map_err(|_| RelayError::InvalidUrl(format!("Invalid URL: {target}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(RelayError::InvalidUrl(format!(
                "Scheme '{scheme}' not allowed, only http/https"
            )));
        }
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(RelayError::InvalidUrl(format!("No host in URL: {target}")));
    }

    Ok(parsed)
}

/// Build a [`ProxyRequest`] from the raw `url` parameter.
pub fn classify<'a>(
    raw: &str,
    range: Option<HeaderValue>,
    overrides: &'a crate::host_overrides::HostOverrides,
) -> Result<ProxyRequest<'a>, RelayError> {
    let target = parse_target(&decode_target(raw))?;
    let kind = ResourceKind::from_url(&target);
    let overrides = target.host_str().and_then(|host| overrides.lookup(host));

    Ok(ProxyRequest {
        target,
        kind,
        range,
        overrides,
    })
}
