mod args;
mod validators;

use anyhow::{Context, Result};
use args::Args;
use grid_tile_downloader::{download, Config};
use std::convert::TryFrom;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // defaults to INFO if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let dry_run = args.dry_run;
    let config = Config::try_from(args)?;

    if dry_run {
        let tile_count = config.tile_count()?;

        eprintln!(
            "would download {} tiles (approx {}, assuming 10 kb per tile)",
            tile_count,
            pretty_bytes::converter::convert((tile_count as f64) * 10_000f64)
        );

        Ok(())
    } else {
        download(config)
            .await
            .with_context(|| "failed downloading tiles")
    }
}
