//! Fixed CORS header set.
//!
//! Applied to every response, errors included. Range-based segment fetches
//! need `Content-Length`/`Content-Range` exposed to scripts.

use axum::{
    http::{HeaderName, HeaderValue, header},
    response::Response,
};

pub const CORS_HEADERS: [(HeaderName, &str); 5] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (
        header::ACCESS_CONTROL_ALLOW_METHODS,
        "GET, HEAD, POST, OPTIONS",
    ),
    (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, Range"),
    (
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        "Content-Length, Content-Range",
    ),
    (header::ACCESS_CONTROL_MAX_AGE, "86400"),
];

/// Response middleware inserting [`CORS_HEADERS`], overwriting any upstream values.
pub async fn apply_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    for (name, value) in CORS_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, response::IntoResponse};

    #[tokio::test]
    async fn adds_all_headers_to_error_responses() {
        let response = (StatusCode::BAD_REQUEST, Body::empty()).into_response();
        let response = apply_cors(response).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        for (name, value) in CORS_HEADERS {
            assert_eq!(response.headers()[&name], value);
        }
    }
}
