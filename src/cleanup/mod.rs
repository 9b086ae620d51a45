use std::path::Path;

use async_trait::async_trait;

/// Releases scratch files after a pipeline run.
///
/// Removal is fire-and-forget: it runs inside failure-handling paths where a
/// second error would mask the primary one, so implementations must swallow
/// every failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScratchCleaner: Send + Sync {
    /// Best-effort removal of the file at `path`. Never fails.
    async fn remove(&self, path: &Path);
}

/// Filesystem-backed cleaner used in production.
pub struct FsCleaner;

#[async_trait]
impl ScratchCleaner for FsCleaner {
    async fn remove(&self, path: &Path) {
        remove_quietly(path).await;
    }
}

/// Delete a file, logging instead of propagating any failure.
pub async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed scratch file"),
        Err(e) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "Failed to remove scratch file"
        ),
    }
}
