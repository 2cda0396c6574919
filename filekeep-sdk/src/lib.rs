//! # filekeep-sdk
//!
//! Blocking client for a running `filekeep start` daemon, for UIs and
//! scripts that want versions of a file without linking the engine.
//!
//! ## Example
//!
//! ```no_run
//! use filekeep_sdk::FilekeepClient;
//!
//! let client = FilekeepClient::new("http://localhost:3030");
//!
//! // Snapshot pending edits right away instead of waiting for the next cycle
//! client.store().unwrap();
//!
//! // Copy the previous version of a file somewhere it can be opened
//! let versions = client.versions("/home/me/notes/todo.txt").unwrap();
//! if versions.len() > 1 {
//!     let copy = client.open_version("/home/me/notes/todo.txt", 2).unwrap();
//!     println!("previous version at {}", copy.display());
//! }
//! ```

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone)]
pub struct FilekeepClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Change {
    pub codes: Vec<String>,
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    pub root: PathBuf,
    pub state: String,
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreReport {
    pub committed: Vec<String>,
    pub failed: Vec<(String, String)>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
    /// 1 is the most recent version.
    pub number: usize,
    pub revision: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct VersionRequest<'a> {
    path: &'a Path,
    version: usize,
}

#[derive(Deserialize)]
struct OpenResponse {
    path: PathBuf,
}

#[derive(Deserialize)]
struct RestoreResponse {
    restored: Option<VersionInfo>,
}

#[derive(Serialize)]
struct PatternRequest<'a> {
    pattern: &'a str,
}

#[derive(Deserialize)]
struct IgnoreResponse {
    pattern: String,
    changed: bool,
}

impl FilekeepClient {
    /// Create a new filekeep client
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the daemon (e.g., "http://localhost:3030")
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Check server health
    pub fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()?;

        Ok(response.status().is_success())
    }

    /// Pending changes and what the poller is doing
    pub fn status(&self) -> Result<Status> {
        let response = self
            .client
            .get(format!("{}/status", self.base_url))
            .send()?;

        Ok(check(response)?.json()?)
    }

    /// Commit every pending change now
    pub fn store(&self) -> Result<StoreReport> {
        let response = self
            .client
            .post(format!("{}/store", self.base_url))
            .send()?;

        Ok(check(response)?.json()?)
    }

    /// Recorded versions of `path`, most recent first
    pub fn versions(&self, path: impl AsRef<Path>) -> Result<Vec<VersionInfo>> {
        let path = path.as_ref().to_string_lossy().into_owned();
        let response = self
            .client
            .get(format!("{}/versions", self.base_url))
            .query(&[("path", path)])
            .send()?;

        Ok(check(response)?.json()?)
    }

    /// Copy version `version` of `path` to the daemon's temp directory and
    /// return where the copy is.
    pub fn open_version(&self, path: impl AsRef<Path>, version: usize) -> Result<PathBuf> {
        let request = VersionRequest {
            path: path.as_ref(),
            version,
        };
        let response = self
            .client
            .post(format!("{}/versions/open", self.base_url))
            .json(&request)
            .send()?;

        let opened: OpenResponse = check(response)?.json()?;
        Ok(opened.path)
    }

    /// Make version `version` of `path` current again. Returns the new
    /// version, or `None` when the content was already current.
    pub fn restore_version(
        &self,
        path: impl AsRef<Path>,
        version: usize,
    ) -> Result<Option<VersionInfo>> {
        let request = VersionRequest {
            path: path.as_ref(),
            version,
        };
        let response = self
            .client
            .post(format!("{}/versions/restore", self.base_url))
            .json(&request)
            .send()?;

        let restored: RestoreResponse = check(response)?.json()?;
        Ok(restored.restored)
    }

    /// Current ignore patterns
    pub fn ignored(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/ignore", self.base_url))
            .send()?;

        Ok(check(response)?.json()?)
    }

    /// Ignore a keyword such as `log` or `.log`. Returns the stored pattern
    /// and whether it was new.
    pub fn add_ignored(&self, keyword: &str) -> Result<(String, bool)> {
        let response = self
            .client
            .post(format!("{}/ignore", self.base_url))
            .json(&PatternRequest { pattern: keyword })
            .send()?;

        let added: IgnoreResponse = check(response)?.json()?;
        Ok((added.pattern, added.changed))
    }

    /// Stop ignoring `pattern`. Returns false when it was not listed.
    pub fn remove_ignored(&self, pattern: &str) -> Result<bool> {
        let response = self
            .client
            .delete(format!("{}/ignore", self.base_url))
            .json(&PatternRequest { pattern })
            .send()?;

        let removed: IgnoreResponse = check(response)?.json()?;
        Ok(removed.changed)
    }
}

/// Turn an error status into an error carrying the daemon's message.
fn check(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().unwrap_or_default();
    bail!("filekeep returned {}: {}", status, message)
}
