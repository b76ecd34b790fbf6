//! `split-data`: write held-out test sets for a dataset.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use rankeval_core::RankevalConfig;
use rankeval_core::config::DEFAULT_CONFIG_FILE;
use rankeval_split::{DEFAULT_RATES, SplitOptions, Splitter};
use tracing::info;

/// Command-line arguments of `split-data`.
#[derive(Debug, Parser)]
#[command(name = "split-data")]
#[command(about = "Split a dataset into reproducible held-out test sets", long_about = None)]
pub struct SplitDataArgs {
    /// Number of cross-folds
    #[arg(short = 'p', value_name = "PARTS")]
    pub partitions: Option<usize>,

    /// Number of test users
    #[arg(short = 'u', value_name = "USERS")]
    pub users: Option<usize>,

    /// Number of test items per user
    #[arg(short = 'n', value_name = "RATES", default_value_t = DEFAULT_RATES)]
    pub rates: usize,

    /// Repeatedly re-split REPS times
    #[arg(short = 'R', value_name = "REPS")]
    pub repeats: Option<usize>,

    /// Destination directory [default: <split_dir>/<DATASET> from the configuration]
    #[arg(short = 'o', value_name = "OUT")]
    pub output: Option<PathBuf>,

    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Name of the dataset to split
    #[arg(value_name = "DATASET")]
    pub dataset: String,
}

impl SplitDataArgs {
    /// Splitting knobs given on the command line.
    pub const fn options(&self) -> SplitOptions {
        SplitOptions {
            partitions: self.partitions,
            users: self.users,
            rates: self.rates,
            repeats: self.repeats,
        }
    }
}

/// Run `split-data`.
///
/// # Errors
/// Returns an error if the options or configuration are invalid, or the dataset cannot be
/// loaded or written
pub fn run(args: &SplitDataArgs) -> Result<()> {
    let config = RankevalConfig::load_or_default(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;

    let mut splitter = Splitter::from_config(&config).context("Failed to load params")?;
    if let Some(output) = &args.output {
        splitter = splitter.with_output(output);
    }

    let artifacts = splitter
        .split(&args.dataset, &args.options())
        .with_context(|| format!("Failed to split {}", args.dataset))?;
    info!(
        "Wrote {} test sets to {}",
        artifacts.len(),
        splitter.dataset_dir(&args.dataset).display()
    );
    Ok(())
}
