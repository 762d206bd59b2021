use crate::{
    classify::{self, ProxyRequest, ResourceKind},
    error::{RelayError, Result},
    hls::{self, MANIFEST_CONTENT_TYPE},
    metrics,
    server::state::AppState,
    upstream,
};
use axum::{
    body::Body,
    extract::{RawQuery, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use futures_util::TryStreamExt;
use std::time::Instant;
use tracing::{info, warn};

const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// Content type assumed for non-manifest bodies without one.
const DEFAULT_SEGMENT_CONTENT_TYPE: &str = "video/mp2t";

/// CORS preflight. Never contacts the origin, whatever the query says.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Relay a playlist or segment from its origin.
///
/// Manifests are buffered and rewritten so every reference re-enters this
/// endpoint. Everything else is streamed through untouched; dropping the
/// response body (client abort) drops the upstream connection with it.
pub async fn relay(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    let mut kind = ResourceKind::Opaque;

    let result = forward(&state, query.as_deref(), &headers, &mut kind).await;

    let response = result.unwrap_or_else(IntoResponse::into_response);
    metrics::record_request(kind.as_str(), response.status().as_u16());
    metrics::record_duration(kind.as_str(), start);
    response
}

async fn forward(
    state: &AppState,
    query: Option<&str>,
    headers: &HeaderMap,
    kind: &mut ResourceKind,
) -> Result<Response> {
    let raw = query
        .and_then(classify::url_param)
        .ok_or(RelayError::MissingUrl)?;

    let range = headers.get(header::RANGE).cloned();
    let request = classify::classify(&raw, range, &state.host_overrides)?;
    *kind = request.kind;

    info!("Relaying {} {}", request.kind, request.log_target());

    let response = upstream::fetch(&state.http_client, &request).await?;

    let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
    let is_manifest = request.kind == ResourceKind::Manifest
        || content_type
            .as_ref()
            .and_then(|v| v.to_str().ok())
            .is_some_and(hls::is_manifest_content_type);

    if is_manifest {
        *kind = ResourceKind::Manifest;
        serve_manifest(&request, response).await
    } else {
        serve_passthrough(&request, response, content_type)
    }
}

async fn serve_manifest(
    request: &ProxyRequest<'_>,
    response: reqwest::Response,
) -> Result<Response> {
    // Relative references resolve against where the playlist actually lives,
    // i.e. after redirects.
    let base = response.url().clone();
    let content = response.text().await.map_err(|e| {
        warn!("Failed to read playlist body for {}: {}", request.log_target(), e);
        RelayError::Network(e.without_url())
    })?;

    let rewritten = hls::rewrite_manifest(&content, &base);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, MANIFEST_CONTENT_TYPE),
            (header::CACHE_CONTROL, NO_CACHE),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
        ],
        rewritten,
    )
        .into_response())
}

fn serve_passthrough(
    request: &ProxyRequest<'_>,
    response: reqwest::Response,
    content_type: Option<HeaderValue>,
) -> Result<Response> {
    let status = response.status();
    let upstream_headers = response.headers();

    let mut builder = Response::builder()
        .status(status)
        .header(
            header::CONTENT_TYPE,
            content_type.unwrap_or(HeaderValue::from_static(DEFAULT_SEGMENT_CONTENT_TYPE)),
        )
        .header(header::CACHE_CONTROL, NO_CACHE)
        .header(header::PRAGMA, "no-cache")
        .header(header::EXPIRES, "0");

    if let Some(length) = upstream_headers.get(header::CONTENT_LENGTH) {
        builder = builder.header(header::CONTENT_LENGTH, length.clone());
    }
    if let Some(range) = upstream_headers.get(header::CONTENT_RANGE) {
        builder = builder
            .header(header::CONTENT_RANGE, range.clone())
            .header(header::ACCEPT_RANGES, "bytes");
    }

    let target = request.log_target();
    let stream = response.bytes_stream().inspect_err(move |e| {
        warn!("Upstream body aborted for {}: {}", target, e);
    });

    builder
        .body(Body::from_stream(stream))
        .map_err(|e| RelayError::Internal(format!("Failed to build response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn preflight_is_ok() {
        assert_eq!(preflight().await, StatusCode::OK);
    }
}
