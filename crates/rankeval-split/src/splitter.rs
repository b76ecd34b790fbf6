//! Dataset splitting into held-out test sets.

use std::path::{Path, PathBuf};

use rand::SeedableRng as _;
use rand_chacha::ChaCha8Rng;
use rankeval_core::table::write_test_set;
use rankeval_core::{DatasetRegistry, Error, Interaction, Params, RankevalConfig, Result};
use tracing::{info, warn};

use crate::crossfold::{Fold, group_by_user, partition_users, sample_repeated, sample_users};

/// Operation tag mixed into the seed of every split.
pub const SPLIT_TAG: &str = "split-data";

/// Default number of test rows per user.
pub const DEFAULT_RATES: usize = 5;

/// Upper bound on the number of folds or samples of one split.
pub const MAX_FOLDS: usize = 1000;

/// Knobs of one split, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOptions {
    /// Number of cross-folds
    pub partitions: Option<usize>,
    /// Number of test users per fold or sample
    pub users: Option<usize>,
    /// Number of test rows per user
    pub rates: usize,
    /// Number of repeated samples
    pub repeats: Option<usize>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            partitions: None,
            users: None,
            rates: DEFAULT_RATES,
            repeats: None,
        }
    }
}

/// A validated splitting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPlan {
    /// Cross-folds with disjoint test rows per user.
    Partition {
        /// Number of folds
        partitions: usize,
        /// Users per fold; every user when absent
        users: Option<usize>,
        /// Test rows per user and fold
        rates: usize,
    },
    /// Independent user samples.
    Sample {
        /// Number of samples
        samples: usize,
        /// Users per sample
        users: usize,
        /// Test rows per user
        rates: usize,
        /// Whether artifacts are numbered (`test-0`…) or a single `test`
        numbered: bool,
    },
}

fn positive(value: Option<usize>, flag: &str) -> Result<Option<usize>> {
    match value {
        Some(0) => Err(Error::Config(format!("{flag} must be positive"))),
        other => Ok(other),
    }
}

fn bounded(value: Option<usize>, flag: &str) -> Result<Option<usize>> {
    match positive(value, flag)? {
        Some(count) if count > MAX_FOLDS => Err(Error::Config(format!(
            "{flag} {count} exceeds the limit of {MAX_FOLDS}"
        ))),
        other => Ok(other),
    }
}

impl SplitPlan {
    /// Validate options and pick a strategy.
    ///
    /// # Errors
    /// Returns a configuration error if neither partitions nor users are given, if any count
    /// is zero, or if the partition or repetition count exceeds [`MAX_FOLDS`]
    pub fn from_options(options: &SplitOptions) -> Result<Self> {
        let partitions = bounded(options.partitions, "partition count")?;
        let users = positive(options.users, "user count")?;
        let repeats = bounded(options.repeats, "repetition count")?;
        if options.rates == 0 {
            return Err(Error::Config("test rows per user must be positive".to_owned()));
        }

        match (partitions, users) {
            (Some(partitions), users) => {
                if repeats.is_some() {
                    warn!("reps and partitions incompatible, ignoring reps");
                }
                Ok(Self::Partition {
                    partitions,
                    users,
                    rates: options.rates,
                })
            }
            (None, Some(users)) => Ok(Self::Sample {
                samples: repeats.unwrap_or(1),
                users,
                rates: options.rates,
                numbered: repeats.is_some(),
            }),
            (None, None) => Err(Error::Config(
                "must specify at least one of partitions and users".to_owned(),
            )),
        }
    }

    /// File names of the artifacts, in fold order.
    pub fn artifact_names(&self) -> Vec<String> {
        match *self {
            Self::Partition { partitions, .. } => (1..=partitions)
                .map(|fold| format!("test-{fold}.parquet"))
                .collect(),
            Self::Sample {
                samples,
                numbered: true,
                ..
            } => (0..samples)
                .map(|sample| format!("test-{sample}.parquet"))
                .collect(),
            Self::Sample { .. } => vec!["test.parquet".to_owned()],
        }
    }
}

/// One written test set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitArtifact {
    /// Location of the test set
    pub path: PathBuf,
    /// Number of test rows
    pub rows: usize,
}

/// Where a split's artifacts go.
#[derive(Debug, Clone, PartialEq, Eq)]
enum OutputDir {
    /// `<root>/<dataset>/`
    SplitRoot(PathBuf),
    /// Exactly this directory
    Exact(PathBuf),
}

/// Splits registered datasets into reproducible test sets.
#[derive(Debug, Clone)]
pub struct Splitter {
    registry: DatasetRegistry,
    params: Params,
    output: OutputDir,
}

impl Splitter {
    /// Splitter writing under `split_root/<dataset>/`.
    pub fn new(registry: DatasetRegistry, params: Params, split_root: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            params,
            output: OutputDir::SplitRoot(split_root.into()),
        }
    }

    /// Splitter configured from `rankeval.toml`, reading seeds from the params file.
    ///
    /// # Errors
    /// Returns an error if the params file exists but cannot be parsed
    pub fn from_config(config: &RankevalConfig) -> Result<Self> {
        let params = Params::load(&config.paths.params_file)?;
        Ok(Self::new(
            DatasetRegistry::from_config(config),
            params,
            config.paths.split_dir.clone(),
        ))
    }

    /// Write artifacts directly into `output`, whatever the dataset.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = OutputDir::Exact(output.into());
        self
    }

    /// Directory the artifacts of `dataset` are written to.
    pub fn dataset_dir(&self, dataset: &str) -> PathBuf {
        match &self.output {
            OutputDir::SplitRoot(root) => root.join(dataset),
            OutputDir::Exact(dir) => dir.clone(),
        }
    }

    /// Compute the folds of `rows` for `dataset` without writing anything.
    pub fn folds(&self, dataset: &str, rows: &[Interaction], plan: &SplitPlan) -> Vec<Fold> {
        let seed = self.params.derive(&[SPLIT_TAG, dataset]);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        match *plan {
            SplitPlan::Partition {
                partitions,
                users: Some(users),
                rates,
            } => {
                let available = group_by_user(rows).len();
                if partitions.saturating_mul(users) > available {
                    warn!(
                        "{partitions} samples of {users} users need more than the {available} users available, partitioning all users instead"
                    );
                    partition_users(rows, partitions, rates, &mut rng)
                } else {
                    info!("computing {partitions} samples of {users} users");
                    sample_users(rows, partitions, users, rates, &mut rng)
                }
            }
            SplitPlan::Partition {
                partitions, rates, ..
            } => {
                info!("computing {partitions} partitions");
                partition_users(rows, partitions, rates, &mut rng)
            }
            SplitPlan::Sample {
                samples,
                users,
                rates,
                ..
            } => sample_repeated(rows, samples, users, rates, &mut rng),
        }
    }

    /// Load `dataset`, split it, and write its test sets.
    ///
    /// # Errors
    /// Returns an error if the options are invalid, the dataset is unknown or unreadable, or
    /// an artifact cannot be written
    pub fn split(&self, dataset: &str, options: &SplitOptions) -> Result<Vec<SplitArtifact>> {
        let plan = SplitPlan::from_options(options)?;
        let rows = self.registry.load(dataset)?;
        info!("loaded {} ratings for {dataset}", rows.len());
        self.write_folds(dataset, &rows, &plan)
    }

    /// Split already-loaded rows and write their test sets.
    ///
    /// # Errors
    /// Returns an error if an artifact cannot be written
    pub fn write_folds(
        &self,
        dataset: &str,
        rows: &[Interaction],
        plan: &SplitPlan,
    ) -> Result<Vec<SplitArtifact>> {
        let dir = self.dataset_dir(dataset);
        info!("writing to {}", dir.display());

        let folds = self.folds(dataset, rows, plan);
        let mut artifacts = Vec::with_capacity(folds.len());
        for (name, fold) in plan.artifact_names().into_iter().zip(&folds) {
            let path = dir.join(name);
            write_artifact(&path, &fold.test(rows))?;
            artifacts.push(SplitArtifact {
                path,
                rows: fold.len(),
            });
        }
        Ok(artifacts)
    }
}

fn write_artifact(path: &Path, test: &[Interaction]) -> Result<()> {
    info!("writing test set {} ({} rows)", path.display(), test.len());
    write_test_set(path, test)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(
        partitions: Option<usize>,
        users: Option<usize>,
        repeats: Option<usize>,
    ) -> SplitOptions {
        SplitOptions {
            partitions,
            users,
            repeats,
            ..SplitOptions::default()
        }
    }

    #[test]
    fn test_plan_requires_partitions_or_users() {
        let error = SplitPlan::from_options(&SplitOptions::default()).unwrap_err();
        assert!(error.is_config());
    }

    #[test]
    fn test_plan_rejects_zero_counts() {
        for bad in [
            options(Some(0), None, None),
            options(None, Some(0), None),
            options(None, Some(5), Some(0)),
            SplitOptions {
                rates: 0,
                ..options(Some(5), None, None)
            },
        ] {
            assert!(SplitPlan::from_options(&bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn test_plan_rejects_oversized_counts() {
        for bad in [
            options(Some(usize::MAX), None, None),
            options(Some(MAX_FOLDS + 1), Some(10), None),
            options(None, Some(10), Some(usize::MAX)),
        ] {
            let error = SplitPlan::from_options(&bad).unwrap_err();
            assert!(error.is_config(), "{bad:?}");
        }
        assert!(SplitPlan::from_options(&options(Some(MAX_FOLDS), None, None)).is_ok());
    }

    #[test]
    fn test_output_dir_resolution() {
        let splitter = Splitter::new(DatasetRegistry::default(), Params::default(), "data-split");
        assert_eq!(splitter.dataset_dir("ml"), PathBuf::from("data-split/ml"));

        let exact = splitter.with_output("out/ml-test");
        assert_eq!(exact.dataset_dir("ml"), PathBuf::from("out/ml-test"));
    }

    #[test]
    fn test_partitions_win_over_repeats() {
        let plan = SplitPlan::from_options(&options(Some(3), None, Some(4))).unwrap();
        assert_eq!(
            plan,
            SplitPlan::Partition {
                partitions: 3,
                users: None,
                rates: DEFAULT_RATES
            }
        );
    }

    #[test]
    fn test_artifact_names() {
        let partition = SplitPlan::from_options(&options(Some(3), Some(10), None)).unwrap();
        assert_eq!(
            partition.artifact_names(),
            vec!["test-1.parquet", "test-2.parquet", "test-3.parquet"]
        );

        let repeated = SplitPlan::from_options(&options(None, Some(10), Some(2))).unwrap();
        assert_eq!(
            repeated.artifact_names(),
            vec!["test-0.parquet", "test-1.parquet"]
        );

        let single = SplitPlan::from_options(&options(None, Some(10), None)).unwrap();
        assert_eq!(single.artifact_names(), vec!["test.parquet"]);
    }
}
