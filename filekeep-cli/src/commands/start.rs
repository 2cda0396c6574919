use anyhow::Result;
use colored::Colorize;
use filekeep_server::FilekeepServer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

pub async fn run(repo: PathBuf, config: Option<PathBuf>, port: u16) -> Result<()> {
    let (source, settings) = super::load_config(&repo, config)?;
    super::open_repository(&settings.target_path)?;
    if !source.exists() {
        source.store(&settings)?;
    }

    println!("{}", "Starting filekeep...".bold().cyan());
    println!("   {}: {:?}", "Watching".bold(), settings.target_path);
    println!("   {}: {:?}", "Settings".bold(), source.path());
    println!(
        "   {}: every {}s{}",
        "Snapshots".bold(),
        settings.interval().as_secs(),
        if settings.active { "" } else { " (paused)" }
    );

    let server = FilekeepServer::new(Arc::new(source))?;
    let token = server.shutdown_token();

    println!(
        "   {}: {}",
        "API Server".bold(),
        format!("http://localhost:{}", port).green()
    );
    println!();
    println!("{}", "Press Ctrl+C to stop".dimmed());
    println!();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl+C: {}", e);
            return;
        }
        token.cancel();
    });

    let addr = format!("0.0.0.0:{}", port).parse()?;
    server.serve(addr).await?;

    println!("{}", "Stopped".dimmed());
    Ok(())
}
