//! Typed key/value defaults shared between the app and renderer processes.
//!
//! One JSON document (`defaults.json`) in the shared container holds every
//! simple setting: countdown fields, affirmation list, appearance, unlock
//! flags, and the cached artwork record. Each access re-reads the document,
//! so a value committed by one process is visible to the other on its next
//! read without any notification channel.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::write_atomic;
use crate::error::PersistenceError;

const DEFAULTS_FILE: &str = "defaults.json";

/// Key/value store over one shared JSON document.
///
/// Cheap to construct; holds only the container path. Not a cache -- every
/// `get` reads the current on-disk state.
#[derive(Debug, Clone)]
pub struct SharedDefaults {
    root: PathBuf,
}

impl SharedDefaults {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self) -> PathBuf {
        self.root.join(DEFAULTS_FILE)
    }

    /// Read the current document. A missing or malformed file degrades to an
    /// empty map so one corrupt write can never brick every setting.
    fn read_map(&self) -> BTreeMap<String, serde_json::Value> {
        let path = self.file_path();
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(_) => return BTreeMap::new(),
        };
        match serde_json::from_slice(&bytes) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!("defaults document at {} is malformed: {e}", path.display());
                BTreeMap::new()
            }
        }
    }

    fn write_map(&self, map: &BTreeMap<String, serde_json::Value>) -> Result<(), PersistenceError> {
        std::fs::create_dir_all(&self.root).map_err(|e| PersistenceError::WriteFailed {
            path: self.root.clone(),
            source: e,
        })?;
        let bytes = serde_json::to_vec_pretty(map)?;
        write_atomic(&self.file_path(), &bytes)
    }

    /// Fetch and deserialize the value under `key`.
    ///
    /// Returns `None` when the key is absent or the stored value does not
    /// deserialize as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let map = self.read_map();
        let value = map.get(key)?.clone();
        serde_json::from_value(value).ok()
    }

    /// Serialize and store `value` under `key`.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), PersistenceError> {
        let mut map = self.read_map();
        map.insert(key.to_string(), serde_json::to_value(value)?);
        self.write_map(&map)
    }

    /// Remove `key`. Removing an absent key is a no-op.
    pub fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let mut map = self.read_map();
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.write_map(&map)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read_map().contains_key(key)
    }
}
