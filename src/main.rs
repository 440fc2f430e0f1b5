// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use pget::naming::split_path;
use pget::prelude::*;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over the flags.
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    debug!(?args, "CLI arguments parsed");

    let mut config = DownloadConfig {
        url: args.url.clone(),
        timeout: Duration::from_secs(args.timeout),
        quiet: args.quiet,
        ..DownloadConfig::default()
    };
    if let Some(procs) = args.procs {
        config.workers = usize::from(procs);
    }
    if let Some(output) = args.output.as_deref() {
        let (name, dir) = split_path(output).context("invalid output path")?;
        if !name.is_empty() {
            config.output_name = Some(name);
        }
        config.destination = dir;
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cleaning up");
            on_signal.cancel();
        }
    });

    let report = run_download(config, cancel)
        .await
        .with_context(|| format!("failed to download {}", args.url))?;

    if !args.quiet {
        println!(
            "Complete: {} ({} bytes, {} workers, {:.2}s)",
            report.path.display(),
            report.bytes,
            report.workers,
            report.elapsed.as_secs_f32()
        );
    }
    Ok(())
}
