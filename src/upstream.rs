//! Outbound HTTP to the stream origin.
//!
//! One GET per relay call. Redirects are followed by the client's default
//! policy and nothing is retried here: recovery belongs to the player.

use crate::{classify::ProxyRequest, error::RelayError, metrics};
use axum::http::{HeaderMap, HeaderValue, header};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, warn};

/// Desktop browser identity presented to origins.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Timeouts for the shared outbound client.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Whole-request timeout, body included
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Build the pooled client shared by all relay calls.
pub fn build_client(config: &UpstreamConfig) -> Result<Client, RelayError> {
    Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| RelayError::Internal(format!("Failed to create HTTP client: {e}")))
}

/// Headers sent on every outbound request before overrides are applied.
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(
        header::ACCEPT_ENCODING,
        HeaderValue::from_static("gzip, deflate, br"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}

/// Full outbound header set: defaults, then host overrides, then `Range`.
pub fn request_headers(request: &ProxyRequest<'_>) -> HeaderMap {
    let mut headers = default_headers();
    if let Some(extra) = request.overrides {
        for (name, value) in extra {
            headers.insert(name.clone(), value.clone());
        }
    }
    if let Some(range) = &request.range {
        headers.insert(header::RANGE, range.clone());
    }
    headers
}

/// Fetch the target from its origin.
///
/// Returns the response only for 2xx statuses; the body is left unread so
/// the caller decides between streaming and buffering.
///
/// # Errors
/// - [`RelayError::Upstream`] when the origin answers non-2xx
/// - [`RelayError::Network`] for DNS, connect, TLS and timeout failures
pub async fn fetch(client: &Client, request: &ProxyRequest<'_>) -> Result<Response, RelayError> {
    debug!(
        "Upstream GET {} (range: {:?}, overrides: {})",
        request.log_target(),
        request.range,
        request.overrides.is_some()
    );

    let response = client
        .get(request.target.clone())
        .headers(request_headers(request))
        .send()
        .await
        .map_err(|e| {
            let e = e.without_url();
            warn!("Upstream fetch failed for {}: {}", request.log_target(), e);
            metrics::record_upstream_error(if e.is_timeout() { "timeout" } else { "network" });
            RelayError::Network(e)
        })?;

    let status = response.status();
    if !status.is_success() {
        warn!("Upstream returned {} for {}", status, request.log_target());
        metrics::record_upstream_error("status");
        return Err(RelayError::Upstream {
            status,
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        });
    }

    Ok(response)
}
