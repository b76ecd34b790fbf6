//! Compute per-user metrics for every run of an algorithm on a dataset.

use anyhow::Result;
use clap::Parser as _;
use rankeval_cli::{ComputeMetricsArgs, compute, init_logging};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;
    compute::run(ComputeMetricsArgs::parse()).await
}
