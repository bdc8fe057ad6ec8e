use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub dataset: DatasetPaths,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub views: ViewDefaults,
}

/// Where the loading collaborator finds its input files.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetPaths {
    /// The pre-joined sales export (orders, reviews, customers, payments).
    pub orders_path: PathBuf,
    /// The state-boundary GeoJSON the choropleth is keyed on.
    pub boundaries_path: PathBuf,
}

/// Bind address for the API server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Default truncation parameters for the top-k views, matching the widget
/// sizes of the dashboard frontend.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewDefaults {
    /// How many categories the best/worst rating widgets show.
    #[serde(default = "default_rating_extremes_k")]
    pub rating_extremes_k: usize,
    /// How many categories the sales-volume widget shows.
    #[serde(default = "default_category_volume_k")]
    pub category_volume_k: usize,
}

impl Default for ViewDefaults {
    fn default() -> Self {
        Self {
            rating_extremes_k: default_rating_extremes_k(),
            category_volume_k: default_category_volume_k(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    3000
}

fn default_rating_extremes_k() -> usize {
    5
}

fn default_category_volume_k() -> usize {
    10
}
