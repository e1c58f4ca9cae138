//! Scratch directories for staging output before it reaches its destination.
//!
//! Staging dirs are never created under the current working directory (e.g. when
//! TMPDIR=tmp), so a half-written bundle can never appear next to the user's files.

use std::env;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::error::Result;

/// Returns an absolute directory path suitable for creating temporary directories.
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        t
    } else {
        #[cfg(windows)]
        {
            env::var("TEMP")
                .or_else(|_| env::var("TMP"))
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
        }
        #[cfg(not(windows))]
        {
            PathBuf::from("/tmp")
        }
    }
}

/// Create a scratch directory that is removed when dropped
///
/// # Errors
///
/// Returns `CourierError::IoError` if the directory cannot be created.
pub fn staging_dir(purpose: &str) -> Result<TempDir> {
    let dir = tempfile::Builder::new()
        .prefix(&format!("opcourier-{purpose}-"))
        .tempdir_in(temp_dir_base())?;
    tracing::debug!(path = %dir.path().display(), "created staging directory");
    Ok(dir)
}
