//! # Prism Core Library
//!
//! Core business logic for Prism, a multi-widget companion app: the user
//! edits content (affirmations, a countdown event, an art preference) in the
//! host app, and small at-a-glance widgets render that content from a shared
//! container. The host app and the widget renderer are two independent
//! processes; each links this crate and constructs its stores over the same
//! shared directory.
//!
//! ## Architecture
//!
//! - **Art pipeline**: resolve one random artwork from a public catalog,
//!   download and downsample its image, persist record + image atomically,
//!   notify the renderer. The single entry point is
//!   [`ArtFetcher::fetch_and_cache`]; everything above it only ever reads.
//! - **Storage**: one shared JSON defaults document for simple settings and
//!   the cached artwork record, plus one fixed-name image file. All writes
//!   are atomic, so readers in the other process never observe a partial
//!   state.
//! - **Scheduling**: a wall-clock re-arm-on-entry schedule driven by the
//!   host's background-task capability, with cooperative cancellation.
//!
//! ## Key Components
//!
//! - [`ArtFetcher`]: pipeline coordinator (retry, backoff, single-flight)
//! - [`ArtResolver`]: catalog + summary metadata resolution
//! - [`ArtCache`]: process-shared record + image persistence
//! - [`RefreshScheduler`]: periodic background refresh
//! - [`SharedDefaults`]: typed settings shared between both processes

pub mod affirmations;
pub mod art;
pub mod config;
pub mod countdown;
pub mod error;
pub mod storage;
pub mod unlock;
pub mod widgets;

pub use art::{
    downsample, ArtAppearance, ArtCache, ArtFetcher, ArtItem, ArtPrefs, ArtResolver, ArtSource,
    CancelToken, FetchStatus, RefreshScheduler,
};
pub use affirmations::{AffirmationItem, AffirmationStore};
pub use config::Config;
pub use countdown::CountdownSettings;
pub use error::{
    CoreError, DownloadError, DownsampleError, PersistenceError, ResolveError,
};
pub use storage::{shared_container_dir, SharedDefaults};
pub use unlock::{Module, UnlockStore};
pub use widgets::{NoopReloader, WidgetKind, WidgetReloader};
