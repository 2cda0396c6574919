pub mod config;
pub mod ignore;
pub mod log;
pub mod restore;
pub mod start;
pub mod status;
pub mod store;
pub mod view;

use anyhow::{Context, Result};
use filekeep_core::{ConfigSource, EngineConfig, Repository, TomlConfig};
use filekeep_sdk::FilekeepClient;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_DAEMON: &str = "http://localhost:3030";

pub fn repo_path(custom_path: Option<PathBuf>) -> Result<PathBuf> {
    let path = match custom_path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    std::fs::canonicalize(&path).with_context(|| format!("Cannot access {:?}", path))
}

/// The settings file lives in `.git` so it is never snapshotted itself.
pub fn config_path(repo: &Path, custom_path: Option<PathBuf>) -> PathBuf {
    custom_path.unwrap_or_else(|| repo.join(".git").join("filekeep.toml"))
}

/// Current settings, or the defaults for `repo` when no file exists yet.
pub fn load_config(
    repo: &Path,
    custom_path: Option<PathBuf>,
) -> Result<(TomlConfig, EngineConfig)> {
    let source = TomlConfig::new(config_path(repo, custom_path));
    let config = if source.exists() {
        source.load()?
    } else {
        EngineConfig::new(repo)
    };
    Ok((source, config))
}

pub fn open_repository(repo: &Path) -> Result<Repository> {
    Repository::open(repo).with_context(|| {
        format!(
            "{:?} is not a git work tree. Run 'git init' there first.",
            repo
        )
    })
}

/// The daemon at `url`, if it is serving `repo`.
///
/// Commands that stage, check out or commit must go through it while it runs,
/// so they are serialized with its polling cycles.
pub fn daemon_for(repo: &Path, url: &str) -> Option<FilekeepClient> {
    let client = FilekeepClient::new(url);
    match client.status() {
        Ok(status) if status.root.as_path() == repo => {
            debug!("Using the daemon at {}", url);
            Some(client)
        }
        Ok(status) => {
            debug!("Daemon at {} serves {:?}, working locally", url, status.root);
            None
        }
        Err(e) => {
            debug!("No daemon at {}: {}", url, e);
            None
        }
    }
}

/// Files named on the command line are relative to the shell, not the repo.
pub fn absolute(file: PathBuf) -> Result<PathBuf> {
    if file.is_absolute() {
        Ok(file)
    } else {
        Ok(std::env::current_dir()?.join(file))
    }
}
