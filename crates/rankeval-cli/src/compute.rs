//! `compute-metrics`: score every run of a (dataset, algorithm) pair.

use std::fs::{create_dir_all, write};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use rankeval_core::RankevalConfig;
use rankeval_core::config::DEFAULT_CONFIG_FILE;
use rankeval_runner::{Aggregator, render_markdown};
use tracing::info;

/// Command-line arguments of `compute-metrics`.
#[derive(Debug, Parser)]
#[command(name = "compute-metrics")]
#[command(about = "Compute per-user top-N metrics for every run of an algorithm", long_about = None)]
pub struct ComputeMetricsArgs {
    /// Output file for the score table
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write a Markdown summary of the scores to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Number of run files evaluated at once (0 = all CPUs)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Dataset name
    #[arg(value_name = "DATA")]
    pub data: String,

    /// Algorithm name
    #[arg(value_name = "ALGO")]
    pub algo: String,
}

/// Run `compute-metrics`.
///
/// # Errors
/// Returns an error if the configuration is invalid or any run fails to evaluate
pub async fn run(args: ComputeMetricsArgs) -> Result<()> {
    let mut config = RankevalConfig::load_or_default(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    if let Some(workers) = args.workers {
        config.evaluate.max_workers = workers;
    }

    let aggregator = Aggregator::from_config(&config).context("Invalid evaluation settings")?;
    let report = aggregator
        .run(&args.data, &args.algo, args.output.as_deref())
        .await
        .with_context(|| format!("Failed to score {}-{}", args.data, args.algo))?;

    if let Some(path) = &args.summary {
        let markdown = render_markdown(
            &args.data,
            &args.algo,
            report.scores.partitions().len(),
            &report.summary,
        );
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        write(path, markdown)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        info!("Summary written to {}", path.display());
    }

    Ok(())
}
