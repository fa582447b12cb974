//! Durable, process-shared artwork cache.
//!
//! One serialized record under a fixed defaults key plus one fixed-name
//! image file (`artwidget/latest.jpg`) in the shared container. The fetch
//! pipeline is the only writer; the renderer process constructs its own
//! `ArtCache` over the same root and only ever calls [`ArtCache::load`].

use std::path::{Path, PathBuf};

use super::item::ArtItem;
use crate::error::PersistenceError;
use crate::storage::{self, SharedDefaults};

const RECORD_KEY: &str = "art_item_cache";
const IMAGE_DIR: &str = "artwidget";
const IMAGE_FILE: &str = "latest.jpg";

/// Cache for the single "current artwork" entity.
#[derive(Debug, Clone)]
pub struct ArtCache {
    defaults: SharedDefaults,
    root: PathBuf,
}

impl ArtCache {
    /// Construct over an injected shared root. Both processes build their
    /// own instance pointed at the same directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            defaults: SharedDefaults::new(&root),
            root,
        }
    }

    fn image_dir(&self) -> PathBuf {
        self.root.join(IMAGE_DIR)
    }

    /// Canonical path of the locally cached image.
    pub fn image_path(&self) -> PathBuf {
        self.image_dir().join(IMAGE_FILE)
    }

    /// Persist `item` under the fixed record key.
    ///
    /// On failure the error is logged and the prior state is left
    /// untouched -- callers keep rendering the last good record.
    pub fn save(&self, item: &ArtItem) {
        if let Err(e) = self.defaults.set(RECORD_KEY, item) {
            tracing::warn!("art cache save failed: {e}");
        }
    }

    /// The last saved record, or `None` if nothing was saved yet or the
    /// stored value no longer deserializes.
    pub fn load(&self) -> Option<ArtItem> {
        self.defaults.get(RECORD_KEY)
    }

    /// Remove the record and every file in the image directory.
    ///
    /// Best-effort: individual file deletions that fail are logged and
    /// skipped, never propagated.
    pub fn clear(&self) {
        if let Err(e) = self.defaults.remove(RECORD_KEY) {
            tracing::warn!("art cache record removal failed: {e}");
        }

        let dir = self.image_dir();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => return, // nothing cached yet
        };
        for entry in entries.flatten() {
            if let Err(e) = std::fs::remove_file(entry.path()) {
                tracing::warn!("could not delete {}: {e}", entry.path().display());
            }
        }
    }

    /// Write the downsampled image bytes under the single reused filename.
    ///
    /// Goes through a temp file and an atomic rename, so a renderer reading
    /// concurrently sees either the previous image or the new one, never a
    /// half-written file.
    pub fn write_image(&self, bytes: &[u8]) -> Result<PathBuf, PersistenceError> {
        let dir = self.image_dir();
        std::fs::create_dir_all(&dir).map_err(|e| PersistenceError::WriteFailed {
            path: dir.clone(),
            source: e,
        })?;
        let path = self.image_path();
        storage::write_atomic(&path, bytes)?;
        Ok(path)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
