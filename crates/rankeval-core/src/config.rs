//! Configuration for directory layout, evaluation, and the dataset registry.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::datasets::DatasetSource;
use crate::error::{Error, Result};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "rankeval.toml";

/// Complete rankeval configuration.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankevalConfig {
    /// Directory layout
    pub paths: PathsConfig,
    /// Evaluation settings
    pub evaluate: EvaluateConfig,
    /// Named datasets available to the splitter
    pub datasets: BTreeMap<String, DatasetSource>,
}

/// Directory layout shared by the splitter and the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of run directories and score artifacts
    pub runs_dir: PathBuf,
    /// Root of per-dataset test-set directories
    pub split_dir: PathBuf,
    /// File holding the base random seed
    pub params_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            runs_dir: PathBuf::from("runs"),
            split_dir: PathBuf::from("data-split"),
            params_file: PathBuf::from("params.toml"),
        }
    }
}

/// How per-user scores are computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One pass over the whole run table per metric
    #[default]
    Bulk,
    /// One metric call per user list
    Scalar,
}

/// Evaluation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluateConfig {
    /// Emit explicit missing rows for undefined scores instead of dropping them
    pub include_missing: bool,
    /// Worker count for parallel run evaluation; 0 uses every available CPU
    pub max_workers: usize,
    /// Scalar or bulk metric computation
    pub strategy: Strategy,
    /// Metrics to compute, in output order
    pub metrics: Vec<MetricConfig>,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self {
            include_missing: true,
            max_workers: 0,
            strategy: Strategy::Bulk,
            metrics: MetricConfig::defaults(),
        }
    }
}

/// One configured metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    /// Output name of the metric
    pub name: String,
    /// Registered metric kind; defaults to the name
    #[serde(default)]
    pub kind: Option<String>,
    /// Rank cutoff
    #[serde(default)]
    pub k: Option<usize>,
    /// Patience for rank-biased precision
    #[serde(default)]
    pub patience: Option<f64>,
}

impl MetricConfig {
    /// Metric with an explicit kind and cutoff.
    pub fn new(name: &str, kind: &str, cutoff: Option<usize>) -> Self {
        Self {
            name: name.to_owned(),
            kind: Some(kind.to_owned()),
            k: cutoff,
            patience: None,
        }
    }

    /// Registered kind this metric resolves to.
    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or(&self.name)
    }

    /// The standard top-N metric set.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("rbp", "rbp", Some(1000)),
            Self::new("ndcg", "ndcg", Some(1000)),
            Self::new("recip_rank", "recip_rank", Some(1000)),
            Self::new("hit", "hit", Some(1000)),
            Self::new("hit10", "hit", Some(10)),
            Self::new("hit20", "hit", Some(20)),
        ]
    }
}

impl RankevalConfig {
    /// Load config from a specific file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|error| {
            Error::Config(format!("Failed to read config {}: {error}", path.display()))
        })?;
        let config: Self = toml::from_str(&contents)?;

        debug!(
            "Loaded config from {}: {} datasets, {} metrics",
            path.display(),
            config.datasets.len(),
            config.evaluate.metrics.len()
        );

        Ok(config)
    }

    /// Load config from `path` if it exists, otherwise fall back to defaults.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Resolved worker count for parallel evaluation.
    pub fn worker_count(&self, available: usize) -> usize {
        match self.evaluate.max_workers {
            0 => available.max(1),
            workers => workers,
        }
    }
}
