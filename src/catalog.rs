//! Static channel catalog.
//!
//! Loaded once at startup. Each channel is annotated with whether the player
//! must reach it through the relay, and the URL to use if so.

use crate::{error::RelayError, hls::relay_url, host_overrides::HostOverrides};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;
use url::Url;

/// Origins that refuse direct browser playback, matched as substrings of
/// the channel URL's hostname.
pub const RELAYED_HOSTS: &[&str] = &[
    "190.92.10.66",
    "135.125.109.73",
    "148.113.207.98",
    "fl1.moveonjoy.com",
    "176.65.146.237",
    "138.68.138.119",
    "68.183.41.209",
    "69.64.57.208",
];

/// Category counted under `sports` in the catalog stats.
const SPORTS_CATEGORY: &str = "sports";

/// A channel entry as published in the catalog file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub stream_type: String,
    #[serde(default)]
    pub quality: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewers: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Accepted catalog file layouts.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Wrapped { channels: Vec<Channel> },
    Bare(Vec<Channel>),
}

/// Channel plus relay routing hints.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelEntry {
    #[serde(flatten)]
    pub channel: Channel,
    pub needs_proxy: bool,
    pub proxy_url: String,
    pub is_secure: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total: usize,
    /// Channels in the `sports` category
    pub sports: usize,
    /// Distinct regions
    pub regions: usize,
    /// Channels marked active
    pub online: usize,
    /// Distinct categories
    pub categories: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    channels: Vec<Channel>,
}

impl Catalog {
    /// Parse catalog JSON: a bare array or `{"channels": [...]}`.
    pub fn from_json(content: &str) -> Result<Self, RelayError> {
        let file: CatalogFile = serde_json::from_str(content)?;
        let channels = match file {
            CatalogFile::Wrapped { channels } | CatalogFile::Bare(channels) => channels,
        };
        Ok(Self { channels })
    }

    /// Load the catalog from disk.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, RelayError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            RelayError::Catalog(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_json(&content).map_err(|e| {
            RelayError::Catalog(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        info!(
            "Loaded {} channels from {}",
            catalog.channels.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Every channel with its routing hints.
    pub fn entries(&self, overrides: &HostOverrides) -> Vec<ChannelEntry> {
        self.channels
            .iter()
            .map(|channel| {
                let needs_proxy = needs_proxy(&channel.url, overrides);
                ChannelEntry {
                    proxy_url: if needs_proxy {
                        relay_url(&channel.url)
                    } else {
                        channel.url.clone()
                    },
                    is_secure: channel.url.starts_with("https://"),
                    needs_proxy,
                    channel: channel.clone(),
                }
            })
            .collect()
    }

    pub fn stats(&self) -> CatalogStats {
        let regions: HashSet<&str> = self.channels.iter().map(|c| c.region.as_str()).collect();
        let categories: HashSet<&str> =
            self.channels.iter().map(|c| c.category.as_str()).collect();

        CatalogStats {
            total: self.channels.len(),
            sports: self
                .channels
                .iter()
                .filter(|c| c.category == SPORTS_CATEGORY)
                .count(),
            regions: regions.len(),
            online: self.channels.iter().filter(|c| c.active).count(),
            categories: categories.len(),
        }
    }
}

/// Whether a browser on an https page has to go through the relay.
///
/// Plain-http streams are blocked as mixed content. Hosts containing one of
/// [`RELAYED_HOSTS`], or listed in the override table, reject direct browser
/// requests. Unparsable URLs are relayed so the relay can report the problem.
pub fn needs_proxy(url: &str, overrides: &HostOverrides) -> bool {
    if url.starts_with("http://") {
        return true;
    }
    match Url::parse(url) {
        Ok(parsed) => parsed.host_str().is_some_and(|host| {
            overrides.contains(host)
                || RELAYED_HOSTS.iter().any(|relayed| host.contains(relayed))
        }),
        Err(_) => true,
    }
}
