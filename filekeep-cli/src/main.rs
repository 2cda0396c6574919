use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{config, ignore, log, restore, start, status, store, view};

#[derive(Parser)]
#[command(name = "filekeep")]
#[command(version, about = "Automatic snapshots of a directory, kept in git", long_about = None)]
struct Cli {
    /// Repository to work in (defaults to current directory)
    #[arg(long, global = true)]
    repo: Option<PathBuf>,

    /// Settings file (defaults to .git/filekeep.toml inside the repository)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Address of a running daemon; commands go through it when it serves
    /// the same repository
    #[arg(long, global = true, default_value = commands::DEFAULT_DAEMON)]
    daemon: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Snapshot the repository on an interval and serve the API
    Start {
        /// Port for the API server
        #[arg(short, long, default_value = "3030")]
        port: u16,
    },

    /// Show pending changes
    Status,

    /// Commit all pending changes now
    Store,

    /// Show the recorded versions of a file
    Log {
        file: PathBuf,

        /// Number of versions to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Copy a version of a file to the temp directory
    View {
        file: PathBuf,

        /// Version number, 1 being the most recent
        version: usize,

        /// Open the copy with the system viewer
        #[arg(long)]
        open: bool,
    },

    /// Make an older version of a file current again
    Restore {
        file: PathBuf,

        /// Version number, 1 being the most recent
        version: usize,

        /// Actually perform the restore (without this, just shows preview)
        #[arg(long)]
        execute: bool,
    },

    /// Manage the ignore list
    Ignore {
        #[command(subcommand)]
        action: ignore::Action,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: config::Action,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let Cli {
        repo,
        config,
        daemon,
        command,
    } = Cli::parse();
    let repo = commands::repo_path(repo)?;

    match command {
        Commands::Start { port } => start::run(repo, config, port).await,
        // the daemon client is blocking
        command => {
            tokio::task::spawn_blocking(move || dispatch(repo, config, &daemon, command)).await?
        }
    }
}

fn dispatch(
    repo: PathBuf,
    config: Option<PathBuf>,
    daemon: &str,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::Start { .. } => unreachable!("start runs on the async runtime"),
        Commands::Status => {
            status::run(repo, config)?;
        }
        Commands::Store => {
            store::run(repo, daemon)?;
        }
        Commands::Log { file, limit } => {
            log::run(repo, file, limit)?;
        }
        Commands::View {
            file,
            version,
            open,
        } => {
            view::run(repo, config, daemon, file, version, open)?;
        }
        Commands::Restore {
            file,
            version,
            execute,
        } => {
            restore::run(repo, daemon, file, version, execute)?;
        }
        Commands::Ignore { action } => {
            ignore::run(repo, daemon, action)?;
        }
        Commands::Config { action } => {
            config::run(repo, config, action)?;
        }
    }

    Ok(())
}
