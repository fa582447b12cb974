//! Countdown-event settings shared with the widget renderer.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::PersistenceError;
use crate::storage::SharedDefaults;
use crate::widgets::{WidgetKind, WidgetReloader};

const TITLE_KEY: &str = "countdown.title";
const DATE_KEY: &str = "countdown.date";
const START_KEY: &str = "countdown.start";

/// Typed accessors for the countdown widget's three fields. Every setter
/// persists and nudges the countdown widget.
pub struct CountdownSettings {
    defaults: SharedDefaults,
    reloader: Arc<dyn WidgetReloader>,
}

impl CountdownSettings {
    pub fn new(root: impl Into<std::path::PathBuf>, reloader: Arc<dyn WidgetReloader>) -> Self {
        Self {
            defaults: SharedDefaults::new(root.into()),
            reloader,
        }
    }

    pub fn title(&self) -> Option<String> {
        self.defaults.get(TITLE_KEY)
    }

    pub fn set_title(&self, title: &str) -> Result<(), PersistenceError> {
        self.defaults.set(TITLE_KEY, &title)?;
        self.reloader.reload_kind(WidgetKind::EventCountdown);
        Ok(())
    }

    /// The event being counted down to.
    pub fn target_date(&self) -> Option<DateTime<Utc>> {
        self.defaults.get(DATE_KEY)
    }

    pub fn set_target_date(&self, date: DateTime<Utc>) -> Result<(), PersistenceError> {
        self.defaults.set(DATE_KEY, &date)?;
        self.reloader.reload_kind(WidgetKind::EventCountdown);
        Ok(())
    }

    /// When the countdown began, for progress rendering.
    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.defaults.get(START_KEY)
    }

    pub fn set_start_date(&self, date: DateTime<Utc>) -> Result<(), PersistenceError> {
        self.defaults.set(START_KEY, &date)?;
        self.reloader.reload_kind(WidgetKind::EventCountdown);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::NoopReloader;
    use chrono::TimeZone;

    #[test]
    fn unset_fields_read_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let settings = CountdownSettings::new(dir.path(), Arc::new(NoopReloader));
        assert_eq!(settings.title(), None);
        assert_eq!(settings.target_date(), None);
        assert_eq!(settings.start_date(), None);
    }

    #[test]
    fn dates_roundtrip_through_the_shared_store() {
        let dir = tempfile::tempdir().unwrap();
        let settings = CountdownSettings::new(dir.path(), Arc::new(NoopReloader));

        let target = Utc.with_ymd_and_hms(2026, 12, 24, 18, 0, 0).unwrap();
        settings.set_title("Noël").unwrap();
        settings.set_target_date(target).unwrap();

        // The renderer process reads through its own instance.
        let renderer = CountdownSettings::new(dir.path(), Arc::new(NoopReloader));
        assert_eq!(renderer.title().as_deref(), Some("Noël"));
        assert_eq!(renderer.target_date(), Some(target));
    }
}
