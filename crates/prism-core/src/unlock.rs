//! Per-module unlock flags.
//!
//! A boolean gate read by presentation code to decide whether a widget's
//! editor is available. Nothing in the fetch pipeline consults it.

use crate::error::PersistenceError;
use crate::storage::SharedDefaults;
use crate::widgets::WidgetKind;

/// The purchasable widget modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Module {
    Countdown,
    Affirmation,
    Art,
}

impl Module {
    pub const ALL: [Module; 3] = [Module::Countdown, Module::Affirmation, Module::Art];

    pub fn id(&self) -> &'static str {
        match self {
            Module::Countdown => "countdown",
            Module::Affirmation => "affirmation",
            Module::Art => "art",
        }
    }

    pub fn widget_kind(&self) -> WidgetKind {
        match self {
            Module::Countdown => WidgetKind::EventCountdown,
            Module::Affirmation => WidgetKind::Affirmations,
            Module::Art => WidgetKind::Art,
        }
    }
}

/// Unlock state over the shared defaults (`unlock.<id>` keys).
#[derive(Debug, Clone)]
pub struct UnlockStore {
    defaults: SharedDefaults,
}

impl UnlockStore {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            defaults: SharedDefaults::new(root.into()),
        }
    }

    fn key(module: Module) -> String {
        format!("unlock.{}", module.id())
    }

    /// Locked until explicitly unlocked.
    pub fn is_unlocked(&self, module: Module) -> bool {
        self.defaults.get(&Self::key(module)).unwrap_or(false)
    }

    pub fn unlock(&self, module: Module) -> Result<(), PersistenceError> {
        self.defaults.set(&Self::key(module), &true)
    }
}
