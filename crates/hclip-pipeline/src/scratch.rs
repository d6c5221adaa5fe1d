//! Per-run scratch directory for cut clips.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::metrics;

/// Name prefix of every scratch directory.
pub const SCRATCH_DIR_PREFIX: &str = "highlight_clips";

/// A working directory owned by one run.
///
/// The directory and everything in it are removed exactly once: on
/// [`ScratchSpace::release`] or, failing that, on drop. Removal errors are
/// logged and counted, never returned.
#[derive(Debug)]
pub struct ScratchSpace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl ScratchSpace {
    /// Create a fresh directory under `parent`, creating `parent` if needed.
    ///
    /// Each call gets its own uniquely named directory, so concurrent runs
    /// sharing a parent never collide.
    pub fn create(parent: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(parent)?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("{}_", SCRATCH_DIR_PREFIX))
            .tempdir_in(parent)?;
        let path = dir.path().to_path_buf();

        debug!(path = %path.display(), "Created scratch directory");
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path for a file named `filename` inside the directory.
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.path.join(filename)
    }

    /// Remove the directory now.
    pub fn release(mut self) {
        self.cleanup();
    }

    fn cleanup(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };

        match dir.close() {
            Ok(()) => debug!(path = %self.path.display(), "Removed scratch directory"),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    "Failed to remove scratch directory: {}", e
                );
                metrics::record_scratch_cleanup_failure();
            }
        }
    }
}

impl Drop for ScratchSpace {
    fn drop(&mut self) {
        self.cleanup();
    }
}
