//! savepoint-locator: print the newest savepoint of a streaming job.
//!
//! DIR is a local path or an `s3://`, `s3a://`, `s3p://` URI. S3 lookups need
//! AWS_REGION (or --region); S3_ENDPOINT / AWS_ENDPOINT_URL select an S3-compatible
//! store.

use anyhow::Context;
use clap::Parser;
use savepoint_cli::{init_tracing, Resolution};
use savepoint_storage::{ObjectStoreConfig, SavepointResolver};

#[derive(Parser)]
#[command(name = "savepoint-locator", about = "Find the latest savepoint in a directory")]
struct Cli {
    /// Savepoint directory (filesystem path or s3/s3a/s3p URI)
    dir: String,
    /// Print a JSON object instead of the bare path
    #[arg(long)]
    json: bool,
    /// AWS region, overrides AWS_REGION
    #[arg(long)]
    region: Option<String>,
    /// Custom S3 endpoint, overrides S3_ENDPOINT
    #[arg(long)]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first, so RUST_LOG and AWS_* from the file are seen by everything below
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let mut config = ObjectStoreConfig::from_env();
    if let Some(region) = cli.region {
        config = config.with_region(region);
    }
    if let Some(endpoint) = cli.endpoint {
        config = config.with_endpoint(endpoint);
    }

    let resolver = SavepointResolver::new(config);
    let savepoint = resolver
        .resolve(&cli.dir)
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, directory = %cli.dir, "Savepoint lookup failed")
        })
        .with_context(|| format!("Failed to find latest savepoint in {}", cli.dir))?;

    match savepoint.as_deref() {
        Some(path) => tracing::info!(directory = %cli.dir, savepoint = %path, "Latest savepoint"),
        None => tracing::info!(directory = %cli.dir, "No savepoint markers found"),
    }

    let resolution = Resolution {
        directory: cli.dir,
        savepoint,
    };

    if cli.json {
        let out = serde_json::to_string_pretty(&resolution).context("Serialize resolution")?;
        println!("{}", out);
    } else {
        println!("{}", resolution.to_line());
    }

    Ok(())
}
