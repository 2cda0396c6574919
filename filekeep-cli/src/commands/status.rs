use anyhow::Result;
use colored::Colorize;
use filekeep_core::ChangeStatus;
use std::path::PathBuf;

pub fn run(repo: PathBuf, config: Option<PathBuf>) -> Result<()> {
    let repository = super::open_repository(&repo)?;
    let (_, settings) = super::load_config(&repo, config)?;
    let changes = repository.scan()?;

    println!("{}", "filekeep Status".bold().cyan());
    println!("  {}: {:?}", "Repository".bold(), repository.workdir());
    println!(
        "  {}: {}",
        "Snapshots".bold(),
        if settings.active {
            format!("every {}s", settings.interval().as_secs()).green()
        } else {
            "paused".yellow()
        }
    );
    println!();

    if changes.is_empty() {
        println!("{}", "No pending changes".green());
        return Ok(());
    }

    println!(
        "{} ({})",
        "Pending Changes".bold(),
        changes.len().to_string().cyan()
    );
    for change in &changes {
        let codes: Vec<_> = change
            .codes
            .iter()
            .map(|status| match status {
                ChangeStatus::Added => "added".green(),
                ChangeStatus::Modified => "modified".yellow(),
                ChangeStatus::Deleted => "deleted".red(),
                ChangeStatus::Untracked => "untracked".blue(),
            }
            .to_string())
            .collect();
        println!("  {:<12} {}", codes.join("+"), change.path);
    }

    Ok(())
}
