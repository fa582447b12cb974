//! The fetch-and-cache pipeline coordinator.
//!
//! One logical operation, [`ArtFetcher::fetch_and_cache`]: resolve metadata
//! (bounded retries with exponential backoff), download the image, bound its
//! size, persist record + image atomically, then nudge the renderer. Every
//! failure is caught and logged here -- callers above this point never see
//! an error, they keep rendering the last good cached artwork.
//!
//! Concurrent invocations (manual refresh, app-launch check, background
//! scheduler) are collapsed into a single flight: a second caller waits for
//! the in-flight cycle and observes its result through the cache.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::cache::ArtCache;
use super::downsampler::downsample;
use super::item::ArtItem;
use super::resolver::ArtSource;
use super::scheduler::CancelToken;
use crate::config::Config;
use crate::error::{DownloadError, Result};
use crate::widgets::WidgetReloader;

/// User-visible state of the pipeline. A manual refresh surfaces this,
/// never a raw error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    /// No cycle ran, or the last cycle was abandoned.
    Idle,
    /// A cycle is in flight.
    Fetching,
    /// The last cycle completed and the cache was rewritten.
    Done,
}

/// Pipeline coordinator. Construct once per process and share.
pub struct ArtFetcher {
    source: Arc<dyn ArtSource>,
    cache: ArtCache,
    reloader: Arc<dyn WidgetReloader>,
    client: reqwest::Client,
    config: Config,
    /// Single-flight guard around the whole cycle.
    flight: tokio::sync::Mutex<()>,
    status: std::sync::Mutex<FetchStatus>,
}

impl ArtFetcher {
    pub fn new(
        source: Arc<dyn ArtSource>,
        cache: ArtCache,
        reloader: Arc<dyn WidgetReloader>,
        config: Config,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(DownloadError::Request)?;

        Ok(Self {
            source,
            cache,
            reloader,
            client,
            config,
            flight: tokio::sync::Mutex::new(()),
            status: std::sync::Mutex::new(FetchStatus::Idle),
        })
    }

    pub fn cache(&self) -> &ArtCache {
        &self.cache
    }

    /// Current pipeline status.
    pub fn status(&self) -> FetchStatus {
        *self.status.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_status(&self, status: FetchStatus) {
        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = status;
    }

    /// Run one fetch-and-cache cycle. Returns the terminal status; never an
    /// error -- an abandoned cycle leaves the previously cached record (if
    /// any) valid and in use.
    ///
    /// Cancellation is cooperative, observed between suspension points: an
    /// expiring execution window aborts the cycle without writing anything;
    /// the next scheduled run retries from scratch.
    pub async fn fetch_and_cache(&self, cancel: &CancelToken) -> FetchStatus {
        let _guard = match self.flight.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                // A cycle is already in flight. Wait for it, then observe
                // its outcome through the shared status/cache.
                let _joined = self.flight.lock().await;
                return self.status();
            }
        };

        self.set_status(FetchStatus::Fetching);
        let status = self.run_cycle(cancel).await;
        self.set_status(status);
        status
    }

    async fn run_cycle(&self, cancel: &CancelToken) -> FetchStatus {
        if cancel.is_cancelled() {
            return FetchStatus::Idle;
        }

        let mut item = match self.resolve_with_retry(cancel).await {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!("art fetch abandoned, keeping cached record: {e}");
                return FetchStatus::Idle;
            }
        };

        if cancel.is_cancelled() {
            return FetchStatus::Idle;
        }

        // Download + downsample are best-effort: any failure here degrades
        // to a metadata-only record, the renderer shows its placeholder.
        match self.download_image(&item.image_url).await {
            Ok(bytes) => {
                match downsample(&bytes, self.config.max_pixel_dimension, self.config.jpeg_quality)
                {
                    Ok(jpeg) => match self.cache.write_image(&jpeg) {
                        Ok(path) => {
                            item.local_image_path = Some(path.display().to_string());
                        }
                        Err(e) => tracing::warn!("image write failed: {e}"),
                    },
                    Err(e) => tracing::warn!("downsample failed: {e}"),
                }
            }
            Err(e) => tracing::warn!("image download failed: {e}"),
        }

        if cancel.is_cancelled() {
            // Abort without touching the record; the image file (if it was
            // replaced above) is already complete and self-consistent.
            return FetchStatus::Idle;
        }

        // Single cache write, after every sub-step is known.
        self.cache.save(&item);
        self.reloader.reload_if_active();
        tracing::info!("cached artwork '{}'", item.title);
        FetchStatus::Done
    }

    /// Metadata resolution with bounded retries and exponential backoff
    /// (0.4s, 0.8s, ... between attempts).
    async fn resolve_with_retry(&self, cancel: &CancelToken) -> Result<ArtItem, crate::error::ResolveError> {
        let attempts = self.config.max_resolve_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match self.source.resolve_one().await {
                Ok(item) => return Ok(item),
                Err(e) => e,
            };
            if attempt >= attempts || cancel.is_cancelled() {
                return Err(err);
            }
            tracing::warn!("resolution attempt {attempt}/{attempts} failed, retrying: {err}");
            tokio::time::sleep(self.backoff_delay(attempt)).await;
            if cancel.is_cancelled() {
                return Err(err);
            }
        }
    }

    fn backoff_delay(&self, failed_attempts: u32) -> Duration {
        self.config.backoff_base() * 2u32.saturating_pow(failed_attempts.saturating_sub(1))
    }

    async fn download_image(&self, raw_url: &str) -> Result<Vec<u8>, DownloadError> {
        let url = url::Url::parse(raw_url).map_err(|_| DownloadError::BadUrl(raw_url.into()))?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(DownloadError::BadStatus(status));
        }
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(DownloadError::EmptyBody);
        }
        Ok(bytes.to_vec())
    }
}
