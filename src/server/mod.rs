pub mod cors;
pub mod handlers;
pub mod state;

use crate::{config::Config, hls::RELAY_PATH, metrics};
use axum::{
    Router,
    http::{HeaderValue, header::HeaderName},
    middleware,
    response::Response,
    routing::get,
};
use state::AppState;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

const METRICS_UPKEEP_PERIOD: Duration = Duration::from_secs(5);

/// Header carrying the relay version on every response.
pub const VERSION_HEADER: &str = "x-relay-version";

/// Build the router with all routes and middleware, without binding a socket.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::health_check))
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::health::metrics))
        .route(RELAY_PATH, get(handlers::proxy::relay).options(handlers::proxy::preflight))
        .route("/api/channels", get(handlers::channels::list_channels))
        .layer(middleware::map_response(cors::apply_cors))
        .layer(middleware::map_response(version_header))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn version_header(mut response: Response) -> Response {
    response.headers_mut().insert(
        HeaderName::from_static(VERSION_HEADER),
        HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
    );
    response
}

/// Start the Axum HTTP server
pub async fn start(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("0.0.0.0:{}", config.port);

    let state = AppState::new(config).await?;
    info!(
        "Loaded {} host overrides and {} channels",
        state.host_overrides.len(),
        state.catalog.len()
    );

    let metrics_handle = state.metrics.clone();
    let app = build_router(state);

    let listener = match tokio::net::TcpListener::bind(addr.as_str()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    info!("Relay listening on http://{}", addr);
    let upkeep = metrics::spawn_upkeep(metrics_handle, METRICS_UPKEEP_PERIOD);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        upkeep.abort();
        return Err(e.into());
    }

    upkeep.abort();
    info!("Relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
