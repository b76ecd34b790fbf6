//! Command-line front ends: `compute-metrics` and `split-data`.
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        reason = "Test allows"
    )
)]

/// `compute-metrics` arguments and entry point.
pub mod compute;
/// Logging setup.
pub mod logging;
/// `split-data` arguments and entry point.
pub mod split;

pub use compute::ComputeMetricsArgs;
pub use logging::init_logging;
pub use split::SplitDataArgs;
