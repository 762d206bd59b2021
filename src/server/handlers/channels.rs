use crate::{catalog::ChannelEntry, catalog::CatalogStats, server::state::AppState};
use axum::{Json, extract::State};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ChannelList {
    pub channels: Vec<ChannelEntry>,
    pub stats: CatalogStats,
}

/// Serve the static catalog, annotated with relay URLs
pub async fn list_channels(State(state): State<AppState>) -> Json<ChannelList> {
    Json(ChannelList {
        channels: state.catalog.entries(&state.host_overrides),
        stats: state.catalog.stats(),
    })
}
