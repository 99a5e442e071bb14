use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use place_enricher::{
    Config, ENV_STORAGE_ROOT, FsStore, Pipeline, RunSummary, StorageEvent, StorageLocation,
    count_resolved, setup_logging,
};

/// Enriches uploaded business datasets with place details.
#[derive(Parser, Debug)]
#[command(name = "place-enricher", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enrich a single uploaded object
    Run {
        /// Container the object was uploaded to
        container: String,
        /// Key of the uploaded object
        key: String,
    },
    /// Enrich every object named in an object-created notification (JSON file, `-` for stdin)
    Event { path: PathBuf },
    /// Count the rows of an enriched object that have an address
    Count { container: String, key: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;
    let cli = Cli::parse();

    match cli.command {
        Command::Run { container, key } => {
            let pipeline = pipeline_from_env()?;
            let summary = pipeline.run(&StorageLocation::new(container, key)).await?;
            report(&summary);
        }
        Command::Event { path } => {
            let raw = read_event(&path)?;
            let event = StorageEvent::from_json(&raw)?;
            let pipeline = pipeline_from_env()?;
            for summary in pipeline.handle_event(&event).await? {
                report(&summary);
            }
        }
        Command::Count { container, key } => {
            // Counting only reads storage, so the lookup credentials are not required.
            let root = std::env::var(ENV_STORAGE_ROOT).unwrap_or_else(|_| ".".to_string());
            let store = FsStore::new(root);
            let count = count_resolved(&store, &StorageLocation::new(container, key)).await?;
            println!("{count}");
        }
    }

    Ok(())
}

fn pipeline_from_env() -> Result<Pipeline> {
    let config = Config::from_env()?;
    Ok(Pipeline::from_config(&config)?)
}

fn read_event(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut raw = Vec::new();
        std::io::stdin().read_to_end(&mut raw)?;
        return Ok(raw);
    }
    fs::read(path).with_context(|| format!("cannot read event file {}", path.display()))
}

// stdout carries one written location per line; summaries are logged separately
fn report(summary: &RunSummary) {
    println!("{}", summary.location);
}
