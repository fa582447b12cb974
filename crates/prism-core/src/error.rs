//! Core error types for prism-core.
//!
//! One enum per failure domain of the art pipeline, aggregated into
//! [`CoreError`]. The orchestrator never lets any of these escape to the
//! caller -- each domain degrades to "keep the last good cached state".

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for prism-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Metadata resolution failed after retries.
    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// Image download failed.
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// Image decode/re-encode failed.
    #[error("Downsample error: {0}")]
    Downsample(#[from] DownsampleError),

    /// Storage failure during save/clear.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Metadata-resolution errors. Retried with backoff by the orchestrator.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The catalog endpoint was unreachable or timed out.
    #[error("Catalog request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The catalog endpoint answered with a non-success status.
    #[error("Catalog returned status {0}")]
    BadStatus(reqwest::StatusCode),

    /// The payload was not the expected structured-results document.
    #[error("Unparsable catalog payload: {0}")]
    Parse(#[from] serde_json::Error),

    /// The payload parsed but lacked a mandatory field.
    #[error("Catalog result missing mandatory field '{0}'")]
    MissingField(&'static str),
}

/// Image-download errors. Not retried; the cycle proceeds metadata-only.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Image URL is not a valid URL: {0}")]
    BadUrl(String),

    #[error("Image request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Image endpoint returned status {0}")]
    BadStatus(reqwest::StatusCode),

    #[error("Image endpoint returned an empty body")]
    EmptyBody,
}

/// Image-downsampling errors. Not retried; the cycle proceeds metadata-only.
#[derive(Error, Debug)]
pub enum DownsampleError {
    #[error("Empty image buffer")]
    EmptyInput,

    #[error("Unrecognized or corrupt image data: {0}")]
    Decode(String),

    #[error("JPEG encoding failed: {0}")]
    Encode(String),
}

/// Storage errors during save/clear or the shared image write.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The record could not be serialized. Prior state is left untouched.
    #[error("Record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Filesystem failure while writing under the shared container.
    #[error("Write to {path} failed: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The shared container directory could not be resolved or created.
    #[error("Shared container unavailable: {0}")]
    ContainerUnavailable(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
