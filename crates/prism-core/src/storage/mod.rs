//! Shared-container storage.
//!
//! Both the host app and the widget renderer construct their stores over the
//! same container directory; there is no ambient global. Writes are atomic
//! (temp file + rename), so a reader in the other process always sees either
//! the old or the new complete state.

mod defaults;

pub use defaults::SharedDefaults;

use std::path::PathBuf;

use crate::error::PersistenceError;

/// Returns the shared container directory, creating it if needed.
///
/// Set PRISM_SHARED_DIR to point both processes (or a test) at an explicit
/// location; otherwise `<data_local_dir>/prism/shared` is used.
pub fn shared_container_dir() -> Result<PathBuf, PersistenceError> {
    let dir = match std::env::var("PRISM_SHARED_DIR") {
        Ok(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("prism")
            .join("shared"),
    };

    std::fs::create_dir_all(&dir).map_err(|e| PersistenceError::WriteFailed {
        path: dir.clone(),
        source: e,
    })?;
    Ok(dir)
}

/// Write `bytes` to `path` atomically: temp file in the same directory, then
/// rename over the destination. Readers never observe a partial file.
pub(crate) fn write_atomic(path: &std::path::Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes).map_err(|e| PersistenceError::WriteFailed {
        path: tmp.clone(),
        source: e,
    })?;
    std::fs::rename(&tmp, path).map_err(|e| PersistenceError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}
