//! Per-file version history.

use crate::error::{Error, Result};
use crate::models::Version;
use crate::repository::Repository;
use chrono::{DateTime, Utc};
use std::path::Path;

impl Repository {
    /// All committed versions of `path`, most recent first, following renames.
    pub fn versions<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Version>> {
        let path = path.as_ref();
        let relative = self.relative_path(path)?;
        let versions = self.versions_of(&relative)?;
        if versions.is_empty() {
            return Err(Error::version(format!(
                "no recorded versions of {}",
                display_name(path)
            )));
        }
        Ok(versions)
    }

    pub(crate) fn versions_of(&self, relative: &str) -> Result<Vec<Version>> {
        let log = self
            .git("log", &["--follow", "--oneline", "--no-decorate", "--", relative])
            .map_err(|e| Error::version(format!("unable to read history of {}: {}", relative, e)))?;

        let mut versions = Vec::new();
        for line in log.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let (revision, message) = line.split_once(' ').unwrap_or((line, ""));
            let timestamp = self.commit_time(revision, relative)?;
            versions.push(Version {
                revision: revision.to_string(),
                message: message.to_string(),
                timestamp,
            });
        }
        Ok(versions)
    }

    fn commit_time(&self, revision: &str, relative: &str) -> Result<DateTime<Utc>> {
        let output = self
            .git("show", &["--no-patch", "--pretty=format:%cI", revision])
            .map_err(|e| {
                Error::version(format!("unable to date {} of {}: {}", revision, relative, e))
            })?;
        parse_timestamp(&output).ok_or_else(|| {
            Error::version(format!(
                "unreadable commit date {:?} for {} of {}",
                output.trim(),
                revision,
                relative
            ))
        })
    }
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim().trim_matches('"');
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.into())
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    const LOG: &str = "log --follow --oneline --no-decorate -- notes.txt";

    #[test]
    fn test_versions_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let backend = scripted()
            .respond(
                LOG,
                "c3c3c3c Modify notes.txt\nb2b2b2b Modify notes.txt\na1a1a1a Add notes.txt\n",
            )
            .respond("show --no-patch --pretty=format:%cI c3c3c3c", "2024-03-01T10:00:02+01:00")
            .respond("show --no-patch --pretty=format:%cI b2b2b2b", "2024-03-01T10:00:01+01:00")
            .respond("show --no-patch --pretty=format:%cI a1a1a1a", "2024-03-01T10:00:00+01:00");
        let (repo, _) = repo_with(temp_dir.path(), backend);

        let versions = repo.versions(temp_dir.path().join("notes.txt")).unwrap();

        assert_eq!(versions.len(), 3);
        assert_eq!(versions[0].revision, "c3c3c3c");
        assert_eq!(versions[2].message, "Add notes.txt");
        assert_eq!(
            versions[2].timestamp,
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
        );
        assert!(versions[0].timestamp > versions[1].timestamp);
    }

    #[test]
    fn test_never_committed_is_version_error() {
        let temp_dir = TempDir::new().unwrap();
        let (repo, _) = repo_with(temp_dir.path(), scripted().respond(LOG, ""));

        let err = repo.versions("notes.txt").unwrap_err();
        assert!(matches!(err, Error::Version(_)));
    }

    #[test]
    fn test_backend_failure_is_version_error() {
        let temp_dir = TempDir::new().unwrap();
        let (repo, _) = repo_with(
            temp_dir.path(),
            scripted().fail(LOG, "fatal: bad revision 'HEAD'"),
        );

        let err = repo.versions("notes.txt").unwrap_err();
        assert!(matches!(err, Error::Version(_)));
    }

    #[test]
    fn test_bad_timestamp_is_version_error() {
        let temp_dir = TempDir::new().unwrap();
        let backend = scripted()
            .respond(LOG, "a1a1a1a Add notes.txt\n")
            .respond("show --no-patch --pretty=format:%cI a1a1a1a", "yesterday");
        let (repo, _) = repo_with(temp_dir.path(), backend);

        assert!(matches!(
            repo.versions("notes.txt").unwrap_err(),
            Error::Version(_)
        ));
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("\"2024-03-01T10:00:00Z\"\n").is_some());
        assert!(parse_timestamp("Fri Mar 1 10:00:00 2024").is_none());
    }
}
