use anyhow::{anyhow, Result};
use clap::Subcommand;
use colored::Colorize;
use filekeep_core::{normalize_keyword, Repository};
use filekeep_sdk::FilekeepClient;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum Action {
    /// List ignore patterns
    List,

    /// Ignore a file type, e.g. `log` or `.log` for `*.log`
    Add { keyword: String },

    /// Stop ignoring a pattern
    Remove { pattern: String },
}

/// Where ignore edits are applied.
enum IgnoreList {
    Daemon(FilekeepClient),
    Local(Repository),
}

impl IgnoreList {
    fn open(repo: &Path, daemon: &str) -> Result<Self> {
        match super::daemon_for(repo, daemon) {
            Some(client) => Ok(Self::Daemon(client)),
            None => Ok(Self::Local(super::open_repository(repo)?)),
        }
    }

    fn patterns(&self) -> Result<Vec<String>> {
        match self {
            Self::Daemon(client) => client.ignored(),
            Self::Local(repository) => Ok(repository.ignored()?.into_iter().collect()),
        }
    }

    fn add(&self, pattern: &str) -> Result<bool> {
        match self {
            Self::Daemon(client) => Ok(client.add_ignored(pattern)?.1),
            Self::Local(repository) => Ok(repository.add_ignored(pattern)?),
        }
    }

    fn remove(&self, pattern: &str) -> Result<bool> {
        match self {
            Self::Daemon(client) => client.remove_ignored(pattern),
            Self::Local(repository) => Ok(repository.remove_ignored(pattern)?),
        }
    }
}

pub fn run(repo: PathBuf, daemon: &str, action: Action) -> Result<()> {
    let list = IgnoreList::open(&repo, daemon)?;

    match action {
        Action::List => {
            let patterns = list.patterns()?;
            if patterns.is_empty() {
                println!("{}", "Nothing is ignored".yellow());
            }
            for pattern in patterns {
                println!("  {}", pattern);
            }
        }
        Action::Add { keyword } => {
            let pattern = normalize_keyword(&keyword)
                .ok_or_else(|| anyhow!("{:?} is not a usable ignore keyword", keyword))?;
            if list.add(&pattern)? {
                println!("{} Ignoring {}", "✓".green(), pattern.cyan());
            } else {
                println!("{} is already ignored", pattern.cyan());
            }
        }
        Action::Remove { pattern } => {
            if list.remove(&pattern)? {
                println!("{} No longer ignoring {}", "✓".green(), pattern.cyan());
            } else {
                println!("{}", format!("{} was not in the ignore list", pattern).yellow());
            }
        }
    }

    Ok(())
}
