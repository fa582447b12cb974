//! Renderer-refresh notification seam.
//!
//! The platform mechanism that re-renders home-screen widgets is an external
//! capability; the core only needs a fire-and-forget "please re-render from
//! the latest cached state" signal that is safe to send when no widget
//! instance is active.

/// The widget kinds this app ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    EventCountdown,
    Affirmations,
    Art,
}

impl WidgetKind {
    /// Stable identifier used by host platforms to address a widget kind.
    pub fn kind_id(&self) -> &'static str {
        match self {
            WidgetKind::EventCountdown => "EventCountdownWidget",
            WidgetKind::Affirmations => "AffirmationsWidget",
            WidgetKind::Art => "ArtWidget",
        }
    }
}

/// Host-supplied reload channel. Every method is best-effort; failures stay
/// inside the implementation.
pub trait WidgetReloader: Send + Sync {
    /// Number of active widget instances, all kinds combined.
    fn active_widget_count(&self) -> usize;

    /// Ask every active instance to re-render from the latest cached state.
    fn reload_all(&self);

    /// Ask instances of one kind to re-render.
    fn reload_kind(&self, _kind: WidgetKind) {
        self.reload_all(); // hosts without per-kind addressing reload everything
    }

    /// Reload only when at least one instance exists -- a no-op otherwise.
    fn reload_if_active(&self) {
        if self.active_widget_count() > 0 {
            self.reload_all();
        }
    }
}

/// Reloader for headless hosts and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReloader;

impl WidgetReloader for NoopReloader {
    fn active_widget_count(&self) -> usize {
        0
    }

    fn reload_all(&self) {}
}
