//! User-authored affirmations, shared with the widget renderer.

pub mod remote;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::storage::SharedDefaults;
use crate::widgets::{WidgetKind, WidgetReloader};

const AFFIRMATIONS_KEY: &str = "affirmations";

/// One affirmation line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffirmationItem {
    pub id: Uuid,
    pub text: String,
}

impl AffirmationItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
        }
    }
}

/// Editor-facing store over the shared defaults.
///
/// Every mutation persists the whole list and nudges the affirmations
/// widget so it re-renders with the new content.
pub struct AffirmationStore {
    defaults: SharedDefaults,
    reloader: Arc<dyn WidgetReloader>,
}

impl AffirmationStore {
    pub fn new(root: impl Into<std::path::PathBuf>, reloader: Arc<dyn WidgetReloader>) -> Self {
        Self {
            defaults: SharedDefaults::new(root.into()),
            reloader,
        }
    }

    /// Load the current list.
    ///
    /// Values written by older app versions as a plain string array are
    /// migrated to items on first read.
    pub fn load(&self) -> Vec<AffirmationItem> {
        if let Some(items) = self.defaults.get::<Vec<AffirmationItem>>(AFFIRMATIONS_KEY) {
            return items;
        }
        if let Some(legacy) = self.defaults.get::<Vec<String>>(AFFIRMATIONS_KEY) {
            let items: Vec<AffirmationItem> =
                legacy.into_iter().map(AffirmationItem::new).collect();
            if let Err(e) = self.persist(&items) {
                tracing::warn!("legacy affirmation migration not persisted: {e}");
            }
            return items;
        }
        Vec::new()
    }

    fn persist(&self, items: &[AffirmationItem]) -> Result<(), PersistenceError> {
        self.defaults.set(AFFIRMATIONS_KEY, &items)?;
        self.reloader.reload_kind(WidgetKind::Affirmations);
        Ok(())
    }

    /// Insert a new affirmation at the front. Whitespace-only input is
    /// ignored.
    pub fn add(&self, text: &str) -> Result<Option<AffirmationItem>, PersistenceError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let item = AffirmationItem::new(trimmed);
        let mut items = self.load();
        items.insert(0, item.clone());
        self.persist(&items)?;
        Ok(Some(item))
    }

    pub fn update(&self, id: Uuid, text: &str) -> Result<(), PersistenceError> {
        let mut items = self.load();
        if let Some(item) = items.iter_mut().find(|i| i.id == id) {
            item.text = text.to_string();
            self.persist(&items)?;
        }
        Ok(())
    }

    pub fn remove(&self, id: Uuid) -> Result<(), PersistenceError> {
        let mut items = self.load();
        let before = items.len();
        items.retain(|i| i.id != id);
        if items.len() != before {
            self.persist(&items)?;
        }
        Ok(())
    }

    /// Reorder: move the item at `from` so it lands at `to`.
    pub fn move_item(&self, from: usize, to: usize) -> Result<(), PersistenceError> {
        let mut items = self.load();
        if from >= items.len() || to > items.len() {
            return Ok(());
        }
        let item = items.remove(from);
        let to = to.min(items.len());
        items.insert(to, item);
        self.persist(&items)
    }
}
