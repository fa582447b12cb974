//! Background refresh scheduling.
//!
//! The scheduler is a wall-clock state machine -- it owns no thread. The
//! host platform (or the [`RefreshScheduler::run`] convenience loop) grants
//! execution time; the core tracks the single "next eligible run" instant
//! and always re-arms on entry, before doing any work, so a crash mid-run
//! never leaves the system permanently unscheduled.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::fetcher::{ArtFetcher, FetchStatus};
use crate::config::Config;

/// Cooperative cancellation flag handed to the pipeline by the task runner.
///
/// Cheap to clone; `cancel()` is observed at the pipeline's suspension
/// points, not mid-decode.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: std::sync::Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: std::sync::Arc::new(tx),
            rx,
        }
    }

    /// Signal that the execution window is expiring.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once `cancel()` has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Periodic refresh schedule for the art pipeline.
#[derive(Debug)]
pub struct RefreshScheduler {
    interval: Duration,
    next_run: Mutex<Option<DateTime<Utc>>>,
}

impl RefreshScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_run: Mutex::new(None),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.refresh_interval())
    }

    /// Register the next eligible run at `now + interval` and return it.
    ///
    /// Called on app launch, on entry to every scheduled run, and after
    /// every completed fetch -- a failure never leaves the system
    /// unscheduled.
    pub fn arm(&self) -> DateTime<Utc> {
        let next = Utc::now()
            + chrono::Duration::from_std(self.interval).unwrap_or(chrono::Duration::zero());
        *self.next_run.lock().unwrap_or_else(|e| e.into_inner()) = Some(next);
        next
    }

    /// The pending "not before" instant, if armed.
    pub fn next_run(&self) -> Option<DateTime<Utc>> {
        *self.next_run.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_armed(&self) -> bool {
        self.next_run().is_some()
    }

    /// Entry point for the host's scheduled wake-up: re-arm first -- before
    /// any work, so a crash mid-run cannot leave the schedule empty -- then
    /// run one fetch cycle under `cancel`, then re-arm relative to
    /// completion.
    pub async fn handle_refresh(&self, fetcher: &ArtFetcher, cancel: &CancelToken) -> FetchStatus {
        self.arm();
        let status = fetcher.fetch_and_cache(cancel).await;
        self.arm();
        status
    }

    /// App-launch hook: populate the cache on true first run, then arm the
    /// periodic schedule.
    pub async fn ensure_initial_fetch(&self, fetcher: &ArtFetcher) -> FetchStatus {
        let status = if fetcher.cache().load().is_none() {
            fetcher.fetch_and_cache(&CancelToken::new()).await
        } else {
            FetchStatus::Idle
        };
        self.arm();
        status
    }

    /// Drive the schedule with tokio timers, for hosts without a native
    /// background-task scheduler. Returns when `cancel` fires.
    pub async fn run(&self, fetcher: &ArtFetcher, cancel: &CancelToken) {
        while !cancel.is_cancelled() {
            let next = match self.next_run() {
                Some(next) => next,
                None => self.arm(),
            };
            let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    self.handle_refresh(fetcher, cancel).await;
                }
                _ = cancel.cancelled() => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::art::cache::ArtCache;
    use crate::art::item::ArtItem;
    use crate::art::resolver::ArtSource;
    use crate::error::ResolveError;
    use crate::widgets::NoopReloader;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSource {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ArtSource for CountingSource {
        async fn resolve_one(&self) -> Result<ArtItem, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ResolveError::MissingField("result"));
            }
            Ok(ArtItem {
                title: "Impression, soleil levant".into(),
                artist: Some("Claude Monet".into()),
                year: Some("1872".into()),
                article_url: "https://fr.wikipedia.org/wiki/Impression,_soleil_levant".into(),
                image_url: "http://127.0.0.1:1/impression.jpg".into(),
                local_image_path: None,
            })
        }
    }

    fn fetcher_over(dir: &std::path::Path, source: Arc<CountingSource>) -> ArtFetcher {
        ArtFetcher::new(
            source,
            ArtCache::new(dir),
            Arc::new(NoopReloader),
            Config::default(),
        )
        .unwrap()
    }

    #[test]
    fn arm_always_schedules_in_the_future() {
        let scheduler = RefreshScheduler::new(Duration::from_secs(6 * 60 * 60));
        assert!(!scheduler.is_armed());

        let before = Utc::now();
        let next = scheduler.arm();
        assert!(next > before);
        assert_eq!(scheduler.next_run(), Some(next));
    }

    #[tokio::test(start_paused = true)]
    async fn handle_refresh_rearms_even_when_the_fetch_fails() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(CountingSource {
            fail: true,
            calls: AtomicUsize::new(0),
        });
        let fetcher = fetcher_over(dir.path(), source.clone());
        let scheduler = RefreshScheduler::new(Duration::from_secs(60));

        let status = scheduler
            .handle_refresh(&fetcher, &CancelToken::new())
            .await;

        assert_eq!(status, FetchStatus::Idle);
        assert!(source.calls.load(Ordering::SeqCst) > 0);
        // Never left unarmed, even after a failed cycle.
        assert!(scheduler.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn initial_fetch_is_skipped_when_the_cache_is_populated() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ArtCache::new(dir.path());
        cache.save(&ArtItem {
            title: "Cached".into(),
            artist: None,
            year: None,
            article_url: "https://en.wikipedia.org/wiki/Cached".into(),
            image_url: "https://example.org/cached.jpg".into(),
            local_image_path: None,
        });

        let source = Arc::new(CountingSource {
            fail: false,
            calls: AtomicUsize::new(0),
        });
        let fetcher = fetcher_over(dir.path(), source.clone());
        let scheduler = RefreshScheduler::new(Duration::from_secs(60));

        let status = scheduler.ensure_initial_fetch(&fetcher).await;

        assert_eq!(status, FetchStatus::Idle);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert!(scheduler.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn initial_fetch_populates_an_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(CountingSource {
            fail: false,
            calls: AtomicUsize::new(0),
        });
        let fetcher = fetcher_over(dir.path(), source.clone());
        let scheduler = RefreshScheduler::new(Duration::from_secs(60));

        let status = scheduler.ensure_initial_fetch(&fetcher).await;

        assert_eq!(status, FetchStatus::Done);
        assert!(fetcher.cache().load().is_some());
        assert!(scheduler.is_armed());
    }

    #[tokio::test]
    async fn run_returns_promptly_once_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(CountingSource {
            fail: true,
            calls: AtomicUsize::new(0),
        });
        let fetcher = fetcher_over(dir.path(), source);
        let scheduler = RefreshScheduler::new(Duration::from_secs(6 * 60 * 60));

        let cancel = CancelToken::new();
        cancel.cancel();
        // Must not sleep out the six-hour interval.
        tokio::time::timeout(Duration::from_secs(1), scheduler.run(&fetcher, &cancel))
            .await
            .expect("run did not observe cancellation");
    }

    #[test]
    fn cancel_token_flips_exactly_once() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
        let clone = token.clone();
        assert!(clone.is_cancelled());
    }
}
