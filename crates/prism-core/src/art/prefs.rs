//! Art-widget appearance preference.

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::storage::SharedDefaults;

const APPEARANCE_KEY: &str = "art.appearance";

/// How the art card is rendered behind the image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtAppearance {
    /// Blur + semi-opaque scrim.
    #[default]
    Auto,
    Transparent,
    Opaque,
}

/// Appearance setting shared with the renderer process.
#[derive(Debug, Clone)]
pub struct ArtPrefs {
    defaults: SharedDefaults,
}

impl ArtPrefs {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            defaults: SharedDefaults::new(root.into()),
        }
    }

    /// Stored appearance; unknown or absent values fall back to `Auto`.
    pub fn appearance(&self) -> ArtAppearance {
        self.defaults.get(APPEARANCE_KEY).unwrap_or_default()
    }

    pub fn set_appearance(&self, value: ArtAppearance) -> Result<(), PersistenceError> {
        self.defaults.set(APPEARANCE_KEY, &value)
    }
}
