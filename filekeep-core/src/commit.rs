//! Commit Engine: one commit per changed path.

use crate::error::{Error, Result};
use crate::models::{ChangeRecord, StoreReport};
use crate::repository::Repository;
use tracing::{debug, info, warn};

impl Repository {
    /// Commit every pending change, one commit per path.
    ///
    /// A failing path is unstaged and reported in [`StoreReport::failed`];
    /// the remaining paths are still processed.
    pub fn store_changes(&self) -> Result<StoreReport> {
        self.store_changes_until(&|| false)
    }

    /// Like [`Repository::store_changes`], but stops before the next path once
    /// `cancelled` returns true. A path that has started is always finished.
    pub fn store_changes_until(&self, cancelled: &dyn Fn() -> bool) -> Result<StoreReport> {
        let changes = self.scan()?;
        let mut report = StoreReport::default();

        for change in changes {
            if cancelled() {
                info!("Store pass cancelled, {} path(s) committed", report.committed.len());
                break;
            }

            match self.store_change(&change) {
                Ok(message) => {
                    info!("Committed: {}", message);
                    report.committed.push(change.path);
                }
                Err(e) => {
                    warn!("Could not commit {}: {}", change.path, e);
                    self.unstage(&change.path);
                    report.failed.push((change.path, e.to_string()));
                }
            }
        }

        Ok(report)
    }

    fn store_change(&self, change: &ChangeRecord) -> Result<String> {
        let path = change.path.as_str();

        let staged;
        let record = if change.is_untracked() {
            self.git("add", &["--", path])?;
            staged = self
                .scan_path(path)?
                .into_iter()
                .find(|record| record.path == change.path)
                .ok_or_else(|| Error::NothingToCommit(format!("{} vanished after staging", path)))?;
            &staged
        } else {
            change
        };

        let message = record
            .commit_message()
            .ok_or_else(|| Error::NothingToCommit(path.to_string()))?;

        self.git("add", &["--", path])?;
        self.git("commit", &["-m", &message, "--", path])?;
        Ok(message)
    }

    /// Reset the index entry for `path` so the next scan retries it cleanly.
    pub(crate) fn unstage(&self, path: &str) {
        if let Err(e) = self.git("reset", &["-q", "HEAD", "--", path]) {
            debug!("Unstaging {} failed: {}", path, e);
        }
    }
}
