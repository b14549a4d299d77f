//! Packing station scanner console
//!
//! # Usage
//!
//! ```bash
//! # Interactive, seeded catalog
//! packing-console
//!
//! # Replay a shift script against a custom catalog
//! packing-console --catalog ./catalog.json --script ./shift.txt
//!
//! # Station overrides from the environment
//! PACKING_IMEI_MIN_LEN=15 PACKING_REQUIRE_REGISTRATION=false packing-console
//! ```
//!
//! Responses go to stdout as JSON lines; logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use packing::{Station, StationConfig};
use packing_console::Console;
use std::path::PathBuf;
use tokio::io::BufReader;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Catalog JSON to load (overrides PACKING_CATALOG_PATH)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Station config TOML; PACKING_* variables still apply on top
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read commands from this file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "packing=debug" (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = match &args.log_level {
        Some(level) => tracing_subscriber::EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log filter '{}'", level))?,
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info".into()),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => StationConfig::load(path)
            .with_context(|| format!("Failed to load station config {}", path.display()))?,
        None => StationConfig::from_env(),
    };
    if let Some(catalog) = args.catalog {
        config.catalog_path = Some(catalog);
    }

    let station = Station::from_config(config).context("Failed to start station")?;
    info!(
        handling_units = station.catalog().handling_units().len(),
        packers = station.catalog().packers().len(),
        workstations = station.catalog().workstations().len(),
        "Packing station ready"
    );

    // Drains until the station (and its bus) is dropped
    let mut events = station.subscribe();
    let event_logger = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => debug!(
                    event_type = event.event_type(),
                    hu = ?event.hu(),
                    at = %event.timestamp(),
                    "Station event"
                ),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event logger lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut console = Console::new(station);
    let mut stdout = tokio::io::stdout();
    let summary = match &args.script {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open script {}", path.display()))?;
            console.run(BufReader::new(file), &mut stdout).await?
        }
        None => {
            console
                .run(BufReader::new(tokio::io::stdin()), &mut stdout)
                .await?
        }
    };

    drop(console);
    event_logger.await.context("Event logger task failed")?;

    info!(
        commands = summary.commands,
        failures = summary.failures,
        "Packing station closed"
    );
    Ok(())
}
