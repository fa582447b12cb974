//! The canonical cached artwork entity shared between app and renderer.

use serde::{Deserialize, Serialize};

/// One piece of art as cached for the widget.
///
/// A record is either remote-only (`local_image_path` absent, renderer shows
/// a placeholder) or fully resolved (`local_image_path` points at the
/// bounded-size JPEG under the shared container). The only writer is the
/// fetch pipeline; copies held by readers are disposable snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtItem {
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    /// 4-digit year, normalized from possibly-prefixed raw date strings.
    #[serde(default)]
    pub year: Option<String>,
    /// Human-readable detail page.
    pub article_url: String,
    /// Remote source image.
    pub image_url: String,
    /// Absolute path of the downsampled local copy, once the download step
    /// has succeeded.
    #[serde(default)]
    pub local_image_path: Option<String>,
}

impl ArtItem {
    /// The record with the local image path attached.
    pub fn with_local_image(mut self, path: String) -> Self {
        self.local_image_path = Some(path);
        self
    }
}

/// Empty optional strings become absent.
pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Reduce a raw inception/date string to a 4-digit year.
///
/// Catalog dates arrive as e.g. `+1503-01-01T00:00:00Z`; strip the sign
/// prefix and keep the numeric 4-character prefix, or nothing.
pub(crate) fn normalize_year(raw: &str) -> Option<String> {
    let clean = raw.trim_start_matches('+');
    let prefix: String = clean.chars().take(4).collect();
    prefix.parse::<i32>().ok().map(|y| y.to_string())
}
