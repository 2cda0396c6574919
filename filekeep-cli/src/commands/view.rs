use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::Command;

pub fn run(
    repo: PathBuf,
    config: Option<PathBuf>,
    daemon: &str,
    file: PathBuf,
    version: usize,
    open: bool,
) -> Result<()> {
    let path = super::absolute(file)?;

    // the daemon copies into its own configured temp directory
    let copy = match super::daemon_for(&repo, daemon) {
        Some(client) => client.open_version(&path, version)?,
        None => {
            let repository = super::open_repository(&repo)?;
            let (_, settings) = super::load_config(&repo, config)?;
            repository.open_version(&path, version, &settings.temp_path)?
        }
    };

    println!(
        "{} {} {}",
        "✓".green(),
        format!("Version {} copied to", version).bold(),
        copy.display().to_string().cyan()
    );

    if open {
        launch(&copy)?;
    }

    Ok(())
}

/// Hand `path` to the platform's default viewer.
fn launch(path: &Path) -> Result<()> {
    let mut command = if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };

    let status = command
        .arg(path)
        .status()
        .with_context(|| format!("Cannot launch a viewer for {:?}", path))?;
    if !status.success() {
        bail!("Viewer exited with {} for {:?}", status, path);
    }
    Ok(())
}
