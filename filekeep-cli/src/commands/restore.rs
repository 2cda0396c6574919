use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn run(
    repo: PathBuf,
    daemon: &str,
    file: PathBuf,
    version: usize,
    execute: bool,
) -> Result<()> {
    let repository = super::open_repository(&repo)?;
    let path = super::absolute(file)?;
    let target = repository.resolve_target(&path, version)?;

    println!("{}", "Restore Preview".bold().cyan());
    println!("  {}: {}", "File".bold(), path.display());
    println!(
        "  {}: {} of {}",
        "Version".bold(),
        target.number,
        target.total
    );
    println!("  {}: {}", "Revision".bold(), target.version.revision);
    println!("  {}: {}", "Message".bold(), target.version.message);
    println!(
        "  {}: {}",
        "Date".bold(),
        target
            .version
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
    );
    println!();

    if target.number == 1 {
        println!("{}", "This is already the current version".yellow());
        return Ok(());
    }

    if !execute {
        println!("{}", "This is a preview only.".yellow());
        println!(
            "Run with {} to actually restore this version",
            "--execute".cyan()
        );
        return Ok(());
    }

    let restored = match super::daemon_for(&repo, daemon) {
        Some(client) => client
            .restore_version(&path, version)?
            .map(|restored| (restored.revision, restored.message)),
        None => repository
            .restore_version(&path, version)?
            .map(|restored| (restored.revision, restored.message)),
    };

    match restored {
        Some((revision, message)) => println!(
            "{}",
            format!("✓ Restored as {}: {}", revision, message)
                .green()
                .bold()
        ),
        None => println!("{}", "Content already matches, nothing restored".yellow()),
    }

    Ok(())
}
