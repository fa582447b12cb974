//! TOML-based pipeline configuration.
//!
//! Stores the tunables of the art-of-the-day pipeline:
//! - Catalog and summary endpoints, fallback image URL
//! - HTTP timeouts and the resolver retry policy
//! - Downsample bound and JPEG quality
//! - Background refresh interval
//!
//! Configuration is stored at `<shared-dir>/config.toml`. A missing or
//! unparsable file falls back to defaults so the pipeline always has a
//! usable configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::storage;

/// Pipeline configuration.
///
/// Serialized to/from TOML at `<shared-dir>/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SPARQL endpoint queried for one random artwork.
    #[serde(default = "default_catalog_endpoint")]
    pub catalog_endpoint: String,
    /// Summary-endpoint base; `{lang}` is replaced by the article language.
    #[serde(default = "default_wikipedia_base")]
    pub wikipedia_base: String,
    /// Safe public image used when no valid image URL can be produced.
    #[serde(default = "default_fallback_image_url")]
    pub fallback_image_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Resolution attempts before the cycle is abandoned.
    #[serde(default = "default_max_resolve_attempts")]
    pub max_resolve_attempts: u32,
    /// First inter-attempt delay; doubles after each failure.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Longer-edge bound for the cached image, in pixels. Chosen to stay
    /// under the renderer's shared-payload size limit.
    #[serde(default = "default_max_pixel_dimension")]
    pub max_pixel_dimension: u32,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Seconds between scheduled background refreshes.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Remote affirmation list (JSON array of `{"text": ...}`).
    #[serde(default = "default_affirmations_endpoint")]
    pub affirmations_endpoint: String,
}

// Default functions
fn default_catalog_endpoint() -> String {
    "https://query.wikidata.org/sparql".into()
}
fn default_wikipedia_base() -> String {
    "https://{lang}.wikipedia.org".into()
}
fn default_fallback_image_url() -> String {
    "https://upload.wikimedia.org/wikipedia/commons/6/6a/Mona_Lisa.jpg".into()
}
fn default_user_agent() -> String {
    "Prism Art Widget/1.0".into()
}
fn default_connect_timeout_secs() -> u64 {
    8
}
fn default_request_timeout_secs() -> u64 {
    12
}
fn default_max_resolve_attempts() -> u32 {
    3
}
fn default_backoff_base_ms() -> u64 {
    400
}
fn default_max_pixel_dimension() -> u32 {
    1024
}
fn default_jpeg_quality() -> u8 {
    85
}
fn default_refresh_interval_secs() -> u64 {
    6 * 60 * 60
}
fn default_affirmations_endpoint() -> String {
    "https://gist.github.com/lucassimonin/ff2f7f12336937ac7fc005f47bb3759b".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_endpoint: default_catalog_endpoint(),
            wikipedia_base: default_wikipedia_base(),
            fallback_image_url: default_fallback_image_url(),
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_resolve_attempts: default_max_resolve_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            max_pixel_dimension: default_max_pixel_dimension(),
            jpeg_quality: default_jpeg_quality(),
            refresh_interval_secs: default_refresh_interval_secs(),
            affirmations_endpoint: default_affirmations_endpoint(),
        }
    }
}

impl Config {
    fn file_path(dir: &Path) -> PathBuf {
        dir.join("config.toml")
    }

    /// Load from the shared container, falling back to defaults.
    pub fn load() -> Self {
        match storage::shared_container_dir() {
            Ok(dir) => Self::load_from(&dir),
            Err(e) => {
                tracing::warn!("shared container unavailable, using default config: {e}");
                Self::default()
            }
        }
    }

    /// Load from an explicit directory, falling back to defaults.
    pub fn load_from(dir: &Path) -> Self {
        let path = Self::file_path(dir);
        let Ok(text) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("config at {} is unparsable, using defaults: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Persist to an explicit directory (atomic).
    pub fn save_to(&self, dir: &Path) -> Result<(), PersistenceError> {
        let text = toml::to_string_pretty(self)
            .map_err(|e| PersistenceError::ContainerUnavailable(e.to_string()))?;
        storage::write_atomic(&Self::file_path(dir), text.as_bytes())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}
