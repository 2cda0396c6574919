//! Ignore list, persisted as the repository's `.gitignore`.
//!
//! The backend honours the file during change detection, and the file itself
//! is versioned like any other, so every edit is followed by a store pass.

use crate::error::{Error, Result};
use crate::repository::Repository;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const IGNORE_FILE: &str = ".gitignore";

impl Repository {
    pub fn ignore_file(&self) -> PathBuf {
        self.workdir().join(IGNORE_FILE)
    }

    /// All ignore patterns, creating the ignore file if it is missing.
    pub fn ignored(&self) -> Result<BTreeSet<String>> {
        let contents = self.read_ignore_file("read")?;
        Ok(patterns(&contents).map(str::to_string).collect())
    }

    /// Add `pattern`. Returns false when it was already present.
    pub fn add_ignored(&self, pattern: &str) -> Result<bool> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(Error::ignore("add to", invalid_pattern()));
        }

        let mut contents = self.read_ignore_file("add to")?;
        if patterns(&contents).any(|existing| existing == pattern) {
            debug!("{} is already ignored", pattern);
            return Ok(false);
        }

        if !contents.is_empty() && !contents.ends_with('\n') {
            contents.push('\n');
        }
        contents.push_str(pattern);
        contents.push('\n');
        rewrite(&self.ignore_file(), &contents).map_err(|e| Error::ignore("add to", e))?;

        info!("Ignoring {}", pattern);
        self.store_ignore_change();
        Ok(true)
    }

    /// Remove `pattern`. Returns false when it was not present.
    pub fn remove_ignored(&self, pattern: &str) -> Result<bool> {
        let pattern = pattern.trim();
        let contents = self.read_ignore_file("remove from")?;

        let mut removed = false;
        let mut kept = String::with_capacity(contents.len());
        for line in contents.lines() {
            if line.trim() == pattern {
                removed = true;
                continue;
            }
            kept.push_str(line);
            kept.push('\n');
        }
        if !removed {
            return Ok(false);
        }

        rewrite(&self.ignore_file(), &kept).map_err(|e| Error::ignore("remove from", e))?;

        info!("No longer ignoring {}", pattern);
        self.store_ignore_change();
        Ok(true)
    }

    fn read_ignore_file(&self, operation: &'static str) -> Result<String> {
        let path = self.ignore_file();
        if !path.exists() {
            std::fs::write(&path, "").map_err(|e| Error::ignore("create", e))?;
            hide(&path);
        }
        std::fs::read_to_string(&path).map_err(|e| Error::ignore(operation, e))
    }

    fn store_ignore_change(&self) {
        match self.store_changes() {
            Ok(report) => debug!("Stored ignore list change: {:?}", report.committed),
            Err(e) => warn!("Ignore list updated but not stored: {}", e),
        }
    }
}

/// Turn a user-entered keyword into a pattern: `txt` and `.txt` both become
/// `*.txt`. Anything already containing glob syntax or a `/` is kept as is.
pub fn normalize_keyword(keyword: &str) -> Option<String> {
    let keyword = keyword.trim();
    if keyword.contains(|c: char| matches!(c, '*' | '?' | '[' | '/')) {
        return Some(keyword.to_string());
    }

    let extension = keyword.trim_start_matches('.');
    if extension.is_empty() {
        None
    } else {
        Some(format!("*.{}", extension))
    }
}

fn patterns(contents: &str) -> impl Iterator<Item = &str> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Replace the contents of an existing file in place. Windows refuses to
/// recreate a hidden file, so this truncates instead of `fs::write`.
fn rewrite(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)?;
    file.write_all(contents.as_bytes())
}

fn invalid_pattern() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty pattern")
}

#[cfg(windows)]
fn hide(path: &Path) {
    let hidden = std::process::Command::new("attrib")
        .arg("+h")
        .arg(path)
        .status();
    if !matches!(hidden, Ok(status) if status.success()) {
        debug!("Could not hide {:?}", path);
    }
}

#[cfg(not(windows))]
fn hide(_path: &Path) {}
