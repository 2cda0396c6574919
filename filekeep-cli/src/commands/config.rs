use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use filekeep_core::EngineConfig;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Action {
    /// Print the current settings
    Show,

    /// Change settings; a running daemon picks them up on its next cycle
    Set {
        /// Seconds between snapshots
        #[arg(long)]
        interval: Option<u64>,

        /// Pause (false) or resume (true) snapshots
        #[arg(long)]
        active: Option<bool>,

        /// Directory to snapshot
        #[arg(long)]
        main: Option<PathBuf>,

        /// Where viewed versions are copied
        #[arg(long)]
        temp: Option<PathBuf>,
    },
}

pub fn run(repo: PathBuf, config: Option<PathBuf>, action: Action) -> Result<()> {
    let (source, mut settings) = super::load_config(&repo, config)?;

    match action {
        Action::Show => {
            if !source.exists() {
                println!("{}", "No settings file yet, showing defaults".dimmed());
            }
            print_settings(&settings, &source.path().display().to_string());
        }
        Action::Set {
            interval,
            active,
            main,
            temp,
        } => {
            if let Some(interval) = interval {
                settings.interval_secs = interval;
            }
            if let Some(active) = active {
                settings.active = active;
            }
            if let Some(main) = main {
                settings.target_path = super::absolute(main)?;
            }
            if let Some(temp) = temp {
                settings.temp_path = super::absolute(temp)?;
            }

            source.store(&settings)?;
            println!("{} Settings saved", "✓".green());
            print_settings(&settings, &source.path().display().to_string());
        }
    }

    Ok(())
}

fn print_settings(settings: &EngineConfig, file: &str) {
    println!("{}", "Settings".bold().cyan());
    println!("  {}: {}", "File".bold(), file.dimmed());
    println!("  {}: {:?}", "Main".bold(), settings.target_path);
    println!("  {}: {:?}", "Temp".bold(), settings.temp_path);
    println!("  {}: {}s", "Interval".bold(), settings.interval().as_secs());
    println!(
        "  {}: {}",
        "Active".bold(),
        if settings.active {
            "yes".green()
        } else {
            "no".yellow()
        }
    );
}
