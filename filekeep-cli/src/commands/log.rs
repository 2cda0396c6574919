use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn run(repo: PathBuf, file: PathBuf, limit: Option<usize>) -> Result<()> {
    let repository = super::open_repository(&repo)?;
    let path = super::absolute(file)?;
    let versions = repository.versions(&path)?;

    println!(
        "{} {}",
        "Versions of".bold().cyan(),
        path.display().to_string().cyan()
    );
    println!();

    let to_show = limit.unwrap_or(versions.len()).min(versions.len());

    for (index, version) in versions.iter().take(to_show).enumerate() {
        println!(
            "  {:>3}  {}  {}  {}",
            (index + 1).to_string().yellow().bold(),
            version.revision.yellow(),
            version
                .timestamp
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .dimmed(),
            version.message
        );
    }

    if versions.len() > to_show {
        println!();
        println!(
            "{}",
            format!("... and {} older versions", versions.len() - to_show).dimmed()
        );
        println!("Use {} to see more", "--limit N".cyan());
    }

    Ok(())
}
