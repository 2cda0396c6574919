use anyhow::Result;
use colored::Colorize;
use filekeep_core::StoreReport;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub fn run(repo: PathBuf, daemon: &str) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
    spinner.set_message("Storing changes...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = store(&repo, daemon);
    spinner.finish_and_clear();
    let report = result?;

    if report.is_empty() {
        println!("{}", "Nothing to store".yellow());
        return Ok(());
    }

    for path in &report.committed {
        println!("  {} {}", "✓".green(), path);
    }
    for (path, reason) in &report.failed {
        println!("  {} {} - {}", "✗".red(), path, reason.dimmed());
    }

    println!();
    if report.failed.is_empty() {
        println!(
            "{}",
            format!("✓ Stored {} file(s)", report.committed.len())
                .green()
                .bold()
        );
    } else {
        println!(
            "{}",
            format!(
                "⚠ Stored {}/{} files, the rest will be retried next cycle",
                report.committed.len(),
                report.committed.len() + report.failed.len()
            )
            .yellow()
            .bold()
        );
    }

    Ok(())
}

fn store(repo: &Path, daemon: &str) -> Result<StoreReport> {
    match super::daemon_for(repo, daemon) {
        Some(client) => {
            let report = client.store()?;
            Ok(StoreReport {
                committed: report.committed,
                failed: report.failed,
            })
        }
        None => Ok(super::open_repository(repo)?.store_changes()?),
    }
}
