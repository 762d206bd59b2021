use hls_relay::{config, server};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting hls-relay {}", env!("CARGO_PKG_VERSION"));

    let config = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    info!("Running in {} mode", if config.is_dev { "DEV" } else { "PROD" });

    if let Err(e) = server::start(config).await {
        error!("Failed to start server: {}", e);
        std::process::exit(1);
    }
}
