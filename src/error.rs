//! Relay error taxonomy and its HTTP mapping.
//!
//! Every failure is converted at the handler boundary into a JSON body of the
//! form `{"error": "<message>"}`. CORS headers are attached by the router
//! middleware, so error responses carry them too.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum RelayError {
    /// The `url` query parameter is absent or empty
    #[error("URL parameter is required")]
    MissingUrl,

    /// The `url` parameter does not describe an absolute http(s) URL
    #[error("Invalid URL format")]
    InvalidUrl(String),

    /// The origin answered with a non-2xx status
    #[error("Upstream error: {} {reason}", .status.as_u16())]
    Upstream { status: StatusCode, reason: String },

    /// DNS, connect, TLS or timeout failure while talking to the origin
    #[error("Internal proxy error")]
    Network(#[from] reqwest::Error),

    #[error("Internal proxy error")]
    Internal(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;

/// JSON error body returned to callers.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl RelayError {
    /// HTTP status this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MissingUrl | RelayError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            RelayError::Upstream { status, .. } => *status,
            RelayError::Network(_)
            | RelayError::Internal(_)
            | RelayError::Catalog(_)
            | RelayError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match &self {
            RelayError::Network(e) => error!("Upstream network failure: {}", e),
            RelayError::Internal(msg) => error!("Internal relay failure: {}", msg),
            RelayError::Catalog(msg) => error!("Catalog failure: {}", msg),
            RelayError::Json(e) => error!("JSON failure: {}", e),
            _ => {}
        }

        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: RelayError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn missing_url_is_bad_request() {
        let (status, json) = body_json(RelayError::MissingUrl).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "URL parameter is required");
    }

    #[tokio::test]
    async fn invalid_url_is_bad_request() {
        let (status, json) = body_json(RelayError::InvalidUrl("nope".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid URL format");
    }

    #[tokio::test]
    async fn upstream_error_keeps_origin_status() {
        let err = RelayError::Upstream {
            status: StatusCode::NOT_FOUND,
            reason: "Not Found".to_string(),
        };
        let (status, json) = body_json(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Upstream error: 404 Not Found");
    }

    #[tokio::test]
    async fn internal_error_hides_details() {
        let (status, json) = body_json(RelayError::Internal("secret detail".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Internal proxy error");
    }
}
