//! Configuration for the rideview CLI.
//!
//! TOML file + `RIDEVIEW_`-prefixed environment overrides, resolved
//! through figment. Defaults match the reference deployment: a local
//! backend, a 30-second poll, and a Portland viewport.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rideview_api::{Region, TransportConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config structs ──────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Base URL of the rideview backend (style + vehicle endpoints).
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Poll period for the live vehicle layer, in seconds.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Per-request wall-clock bound, in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Initial map view.
    #[serde(default)]
    pub map: MapDefaults,

    /// Fallback viewport for headless use, where no map supplies one.
    #[serde(default)]
    pub viewport: ViewportDefaults,

    /// Categorical route → color overrides for the vehicle layer.
    #[serde(default)]
    pub route_colors: Vec<RouteColor>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            refresh_interval_secs: default_refresh_interval(),
            request_timeout_secs: default_timeout(),
            map: MapDefaults::default(),
            viewport: ViewportDefaults::default(),
            route_colors: Vec::new(),
        }
    }
}

/// Initial center/zoom for map-backed frontends.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MapDefaults {
    pub center_lon: f64,
    pub center_lat: f64,
    pub zoom: f64,
}

impl Default for MapDefaults {
    fn default() -> Self {
        // Portland.
        Self {
            center_lon: -122.679_565,
            center_lat: 45.512_794,
            zoom: 12.0,
        }
    }
}

/// Fallback bounding box, `min_lon/min_lat/max_lon/max_lat` degrees.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewportDefaults {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Default for ViewportDefaults {
    fn default() -> Self {
        Self {
            min_lon: -122.719_9,
            min_lat: 45.512,
            max_lon: -122.665,
            max_lat: 45.528,
        }
    }
}

/// One route → color mapping entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteColor {
    pub route: i64,
    pub color: String,
}

fn default_backend_url() -> String {
    "http://localhost:8000".into()
}
fn default_refresh_interval() -> u64 {
    30
}
fn default_timeout() -> u64 {
    30
}

// ── Loading ─────────────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "rideview", "rideview").map_or_else(
        || PathBuf::from("rideview.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

impl Config {
    /// Load from the default path, merging file + environment over
    /// built-in defaults. A missing file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path())
    }

    /// Load from an explicit path (e.g. `--config`).
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("RIDEVIEW_"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Validation {
                field: "refresh_interval_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "request_timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        self.fallback_region().map_err(|e| ConfigError::Validation {
            field: "viewport".into(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    // ── Derived values ───────────────────────────────────────────────

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    /// The fallback viewport as a validated region.
    pub fn fallback_region(&self) -> Result<Region, rideview_api::Error> {
        Region::new(
            self.viewport.min_lon,
            self.viewport.min_lat,
            self.viewport.max_lon,
            self.viewport.max_lat,
        )
    }

    /// Route color pairs in the shape the vehicle layer expects.
    pub fn route_color_pairs(&self) -> Vec<(i64, String)> {
        self.route_colors
            .iter()
            .map(|rc| (rc.route, rc.color.clone()))
            .collect()
    }
}
