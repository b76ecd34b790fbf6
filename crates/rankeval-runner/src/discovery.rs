//! Run file discovery and partition id parsing.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use rankeval_core::{Error, PartitionId, PathsConfig, Result};
use regex::Regex;
use walkdir::WalkDir;

static RUN_FILE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"^recs-(\d+)\.parquet$") {
        Ok(regex) => regex,
        Err(err) => panic!("Run file regex is invalid: {err}"),
    });

/// One recommendation file of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFile {
    /// Partition the file was produced for
    pub partition: PartitionId,
    /// Location of the file
    pub path: PathBuf,
}

/// Parse the partition id out of a `recs-<digits>.parquet` file name.
///
/// # Errors
/// Returns [`Error::RunFileName`] if the name does not have that exact shape
pub fn parse_partition(name: &str) -> Result<PartitionId> {
    RUN_FILE_REGEX
        .captures(name)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
        .ok_or_else(|| Error::RunFileName(name.to_owned()))
}

/// Directory layout of runs and held-out test sets.
#[derive(Debug, Clone)]
pub struct RunLayout {
    runs_dir: PathBuf,
    split_dir: PathBuf,
}

impl RunLayout {
    /// Layout rooted at explicit directories.
    pub fn new(runs_dir: impl Into<PathBuf>, split_dir: impl Into<PathBuf>) -> Self {
        Self {
            runs_dir: runs_dir.into(),
            split_dir: split_dir.into(),
        }
    }

    /// Layout from the `[paths]` config section.
    pub fn from_paths(paths: &PathsConfig) -> Self {
        Self::new(paths.runs_dir.clone(), paths.split_dir.clone())
    }

    /// `<runs_dir>/<dataset>-<algo>`
    pub fn run_dir(&self, dataset: &str, algo: &str) -> PathBuf {
        self.runs_dir.join(format!("{dataset}-{algo}"))
    }

    /// `<split_dir>/<dataset>/test-<id>.parquet`
    pub fn truth_path(&self, dataset: &str, partition: PartitionId) -> PathBuf {
        self.split_dir
            .join(dataset)
            .join(format!("test-{partition}.parquet"))
    }

    /// `<runs_dir>/<dataset>-<algo>-scores.parquet`
    pub fn scores_path(&self, dataset: &str, algo: &str) -> PathBuf {
        self.runs_dir.join(format!("{dataset}-{algo}-scores.parquet"))
    }
}

/// List the run files of a run directory, ordered by partition id.
///
/// Every entry of the directory must be a `recs-<digits>.parquet` file.
///
/// # Errors
/// Returns an error if the directory cannot be read, holds any other entry, two files share a
/// partition id, or no run file is found
pub fn discover(run_dir: &Path) -> Result<Vec<RunFile>> {
    if !run_dir.is_dir() {
        return Err(Error::Config(format!(
            "Run directory {} does not exist",
            run_dir.display()
        )));
    }

    let mut found: BTreeMap<PartitionId, PathBuf> = BTreeMap::new();

    for entry in WalkDir::new(run_dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            return Err(Error::Config(format!(
                "Run directory entry {} is not a run file",
                entry.path().display()
            )));
        }

        let name = entry.file_name().to_string_lossy();
        let partition = parse_partition(&name)?;
        if let Some(first) = found.insert(partition, entry.path().to_path_buf()) {
            return Err(Error::DuplicatePartition {
                partition: partition.get(),
                first,
                second: entry.into_path(),
            });
        }
    }

    if found.is_empty() {
        return Err(Error::Config(format!(
            "No run files found in {}",
            run_dir.display()
        )));
    }

    Ok(found
        .into_iter()
        .map(|(partition, path)| RunFile { partition, path })
        .collect())
}
