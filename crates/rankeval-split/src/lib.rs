//! Reproducible train/test splitting of user interaction histories.
//!
//! Two strategies are supported: cross-fold partitioning, where a user's test rows never
//! repeat across folds, and repeated sampling, where each sample is drawn independently.
//! Randomness comes from a ChaCha stream seeded from the params file and the dataset name,
//! so identical inputs always produce identical test sets.
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::float_cmp,
        reason = "Test allows"
    )
)]

/// Fold construction.
pub mod crossfold;
/// Dataset splitting and artifact writing.
pub mod splitter;

pub use crossfold::{Fold, group_by_user, partition_users, sample_repeated, sample_users};
pub use splitter::{
    DEFAULT_RATES, MAX_FOLDS, SPLIT_TAG, SplitArtifact, SplitOptions, SplitPlan, Splitter,
};
