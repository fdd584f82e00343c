use async_trait::async_trait;

use crate::domain::change::ChangedFileSet;
use crate::domain::pattern::PathFilter;
use crate::error::{AppError, AppResult};

#[async_trait]
pub trait ChangeSource: Send + Sync {
    fn describe(&self) -> String;

    /// Raw categorized changes: renames are not folded and nothing is filtered.
    async fn fetch_changes(&self) -> AppResult<ChangedFileSet>;

    /// Folded and filtered changes, or `None` when they could not be determined.
    ///
    /// Failures are logged here so callers only decide whether the run fails.
    async fn changed_files(&self, filter: Option<&PathFilter>) -> Option<ChangedFileSet> {
        match self.fetch_changes().await {
            Ok(files) => Some(match filter {
                Some(filter) => files.fold_renames().apply_filters(filter),
                None => files,
            }),
            Err(error) => {
                log_failure(&self.describe(), &error);
                None
            }
        }
    }
}

fn log_failure(source: &str, error: &AppError) {
    tracing::error!(%source, %error, "failed to retrieve changed files");
    if let AppError::ExternalTool { stdout, stderr, .. } = error {
        if !stdout.trim().is_empty() {
            tracing::error!(%source, "STDOUT: {}", stdout.trim_end());
        }
        if !stderr.trim().is_empty() {
            tracing::error!(%source, "STDERR: {}", stderr.trim_end());
        }
    }
}
