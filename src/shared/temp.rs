//! Temp-resource guard for transport-downloaded files.
//!
//! Binary modalities arrive as local files the transport downloaded. The
//! file must be deleted on every exit path of the pipeline, and deleting it
//! twice (or after the file is already gone) must be a no-op.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Guard over one downloaded temp file. Release is idempotent: the path is
/// taken out on first release, so a second call (or the `Drop` that runs on
/// early returns) does nothing.
#[derive(Debug)]
pub struct TempFile {
    path: Option<PathBuf>,
}

impl TempFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Guard with nothing to clean up (text/link modalities).
    pub fn none() -> Self {
        Self { path: None }
    }

    /// The guarded path, if still held.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Delete the file if the guard still holds it. Returns true when this
    /// call actually performed the release (for cleanup accounting).
    pub fn release(&mut self) -> bool {
        match self.path.take() {
            Some(p) => {
                match std::fs::remove_file(&p) {
                    Ok(()) => debug!(path = %p.display(), "temp file removed"),
                    // Already gone or never created: fine either way.
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => warn!(path = %p.display(), error = %e, "temp file removal failed"),
                }
                true
            }
            None => false,
        }
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        self.release();
    }
}
