//! Scoped local storage for one transfer's artifact.
//!
//! Each transfer gets its own scratch directory under the download root, so
//! two concurrent transfers resolving the same filename never collide. The
//! directory (and the artifact inside it) is removed by [`Scratch::cleanup`]
//! on normal exit paths and by `Drop` if the transfer future is cancelled.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, error, info};

use super::constants::SCRATCH_DIR_PREFIX;
use super::error::TransferError;

/// Per-transfer scratch directory.
#[derive(Debug)]
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    /// Creates the download root if needed and a fresh scratch directory inside it.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Io`] if either directory cannot be created.
    pub async fn create(download_root: &Path) -> Result<Self, TransferError> {
        tokio::fs::create_dir_all(download_root)
            .await
            .map_err(|e| TransferError::io(download_root, e))?;
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_DIR_PREFIX)
            .tempdir_in(download_root)
            .map_err(|e| TransferError::io(download_root, e))?;
        debug!(path = %dir.path().display(), "created scratch directory");
        Ok(Self { dir })
    }

    /// Path the artifact named `name` will occupy.
    #[must_use]
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Removes the scratch directory and everything in it on the blocking pool.
    ///
    /// Failures are logged, not returned. If this future is dropped early the
    /// removal still finishes on the blocking task.
    pub async fn cleanup(self) {
        let path = self.dir.path().to_path_buf();
        let dir = self.dir;
        match tokio::task::spawn_blocking(move || dir.close()).await {
            Ok(Ok(())) => info!(path = %path.display(), "cleaned up temporary artifact"),
            Ok(Err(e)) => {
                error!(path = %path.display(), error = %e, "error deleting temporary artifact");
            }
            Err(e) => error!(path = %path.display(), error = %e, "cleanup task failed"),
        }
    }
}
