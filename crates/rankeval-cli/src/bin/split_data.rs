//! Split a dataset into held-out test sets.

use anyhow::Result;
use clap::Parser as _;
use rankeval_cli::{SplitDataArgs, init_logging, split};

fn main() -> Result<()> {
    init_logging()?;
    split::run(&SplitDataArgs::parse())
}
