//! Version Accessor: preview and restore of recorded versions.

use crate::error::{Error, Result};
use crate::history::display_name;
use crate::models::Version;
use crate::repository::Repository;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A version selected for viewing or restoring.
#[derive(Debug, Clone)]
pub struct Target {
    pub version: Version,
    pub number: usize,
    pub total: usize,
    relative: String,
}

impl Repository {
    /// Select version `number` of `path`, where 1 is the most recent.
    pub fn resolve_target<P: AsRef<Path>>(&self, path: P, number: usize) -> Result<Target> {
        let path = path.as_ref();
        if !path.is_absolute() {
            return Err(Error::version(format!(
                "{} is not an absolute path",
                path.display()
            )));
        }

        let relative = self.relative_path(path)?;
        let mut versions = self.versions(path)?;
        let total = versions.len();
        if number < 1 || number > total {
            return Err(Error::version(format!(
                "{} has {} version(s), there is no version {}",
                display_name(path),
                total,
                number
            )));
        }

        Ok(Target {
            version: versions.swap_remove(number - 1),
            number,
            total,
            relative,
        })
    }

    /// Copy version `number` of `path` into `temp_dir` and return the copy.
    ///
    /// The revision is checked out into the working tree only long enough to
    /// copy it; the path's index entry and working copy are put back before
    /// returning, on success or failure.
    pub fn open_version<P, T>(&self, path: P, number: usize, temp_dir: T) -> Result<PathBuf>
    where
        P: AsRef<Path>,
        T: AsRef<Path>,
    {
        let path = path.as_ref();
        let target = self.resolve_target(path, number)?;
        let name = display_name(path);
        let failed = |reason: String| {
            Error::version(format!(
                "unable to view version {} of {}: {}",
                number, name, reason
            ))
        };

        self.ensure_clean(&target.relative).map_err(|e| failed(e.to_string()))?;

        let destination = temp_dir.as_ref().join(format!("v{}-{}", number, name));
        let copied = self
            .git("checkout", &[&target.version.revision, "--", &target.relative])
            .map_err(|e| failed(e.to_string()))
            .and_then(|_| {
                std::fs::create_dir_all(temp_dir.as_ref())
                    .and_then(|_| {
                        std::fs::copy(self.workdir().join(&target.relative), &destination)
                    })
                    .map_err(|e| failed(e.to_string()))
            });

        let reverted = self.revert_path(&target.relative).map_err(|e| failed(e.to_string()));
        copied?;
        reverted?;

        info!("Opened version {} of {} at {:?}", number, name, destination);
        Ok(destination)
    }

    /// Make version `number` of `path` the current content, recorded as a new
    /// commit. Returns the new version, or `None` when the content already
    /// matched.
    pub fn restore_version<P: AsRef<Path>>(
        &self,
        path: P,
        number: usize,
    ) -> Result<Option<Version>> {
        let path = path.as_ref();
        let target = self.resolve_target(path, number)?;
        let name = display_name(path);
        let failed = |reason: String| {
            Error::version(format!(
                "unable to restore version {} of {}: {}",
                number, name, reason
            ))
        };

        self.ensure_clean(&target.relative).map_err(|e| failed(e.to_string()))?;

        self.git("checkout", &[&target.version.revision, "--", &target.relative])
            .map_err(|e| failed(e.to_string()))?;

        let outcome = self.scan_path(&target.relative).and_then(|pending| {
            if pending.is_empty() {
                return Ok(false);
            }
            let message = format!("Restore \"{}\"", target.version.message);
            self.git("commit", &["-m", &message, "--", &target.relative])?;
            Ok(true)
        });

        match outcome {
            Ok(false) => {
                info!("Version {} of {} already current, nothing restored", number, name);
                Ok(None)
            }
            Ok(true) => {
                info!("Restored version {} of {}", number, name);
                let latest = self
                    .versions_of(&target.relative)?
                    .into_iter()
                    .next();
                Ok(latest)
            }
            Err(e) => {
                if let Err(revert) = self.revert_path(&target.relative) {
                    warn!("Could not revert {} after failed restore: {}", name, revert);
                }
                Err(failed(e.to_string()))
            }
        }
    }

    /// Unstage `relative` and restore its working copy from the index.
    fn revert_path(&self, relative: &str) -> Result<()> {
        let reset = self.git("reset", &["-q", "HEAD", "--", relative]);
        self.git("checkout", &["--", relative])?;
        reset?;
        Ok(())
    }

    fn ensure_clean(&self, relative: &str) -> Result<()> {
        if self.scan_path(relative)?.is_empty() {
            Ok(())
        } else {
            Err(Error::version(format!(
                "{} has changes that are not stored yet",
                relative
            )))
        }
    }
}
