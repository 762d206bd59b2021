use crate::{
    catalog::Catalog, config::Config, error::Result, host_overrides::HostOverrides, metrics,
    upstream,
};
use metrics_exporter_prometheus::PrometheusHandle;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across all handlers
///
/// Everything here is read-only after startup; handlers share it without
/// locks.
#[derive(Clone)]
pub struct AppState {
    /// Shared HTTP client for connection pooling
    pub http_client: Client,
    /// Per-host outbound header overrides
    pub host_overrides: Arc<HostOverrides>,
    /// Static channel catalog
    pub catalog: Arc<Catalog>,
    pub metrics: PrometheusHandle,
    pub started_at: Instant,
}

impl AppState {
    /// Create the state: outbound client, compiled-in overrides, catalog.
    pub async fn new(config: Config) -> Result<Self> {
        let http_client = upstream::build_client(&config.upstream())?;

        let catalog = match &config.channels_path {
            Some(path) => Catalog::load(path).await?,
            None => Catalog::default(),
        };

        Ok(Self {
            http_client,
            host_overrides: Arc::new(HostOverrides::builtin()),
            catalog: Arc::new(catalog),
            metrics: metrics::init(),
            started_at: Instant::now(),
        })
    }

    /// Replace the override table (used by tests to target local origins).
    pub fn with_host_overrides(mut self, overrides: HostOverrides) -> Self {
        self.host_overrides = Arc::new(overrides);
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }
}
