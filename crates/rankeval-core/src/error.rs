use core::result::Result as CoreResult;
use std::io::Error as IoError;
use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;
use toml::de::Error as TomlError;

/// Result type for rankeval operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors that can occur while splitting data or evaluating runs.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// Arrow array construction or conversion failed.
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Parquet encoding or decoding failed.
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// TOML deserialization failed.
    #[error("TOML deserialization error: {0}")]
    Toml(#[from] TomlError),

    /// Configuration is invalid or an option combination is unsupported.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A run file name does not follow the `recs-<digits>.parquet` convention.
    #[error("Malformed run file name: {0}")]
    RunFileName(String),

    /// Two run files resolve to the same partition id.
    #[error("Duplicate partition {partition}: {first} and {second}")]
    DuplicatePartition {
        /// Partition id both files resolve to
        partition: u32,
        /// First file seen for the partition
        first: PathBuf,
        /// Conflicting file
        second: PathBuf,
    },

    /// The truth file for a partition does not exist.
    #[error("Missing truth file for partition {partition}: {path}")]
    MissingTruth {
        /// Partition id whose truth set is absent
        partition: u32,
        /// Expected location of the truth file
        path: PathBuf,
    },

    /// The named dataset is not declared in the registry.
    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),

    /// A table is missing a required column or has an unusable column type.
    #[error("Invalid table {path}: {reason}")]
    InvalidTable {
        /// Table location
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },

    /// A recommendation list breaks the rank/uniqueness contract.
    #[error("Invalid recommendation list for user {user}: {reason}")]
    InvalidRecommendations {
        /// Owner of the offending list
        user: i64,
        /// What is wrong with it
        reason: String,
    },

    /// A parallel evaluation task failed to complete.
    #[error("Aggregation failed: {0}")]
    Aggregation(String),
}

impl Error {
    /// Whether the error is a configuration problem rather than bad input data.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Toml(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let error1 = Error::Config("must specify at least 1 of -p and -u".to_owned());
        assert_eq!(
            error1.to_string(),
            "Configuration error: must specify at least 1 of -p and -u"
        );

        let error2 = Error::RunFileName("recs-abc.parquet".to_owned());
        assert_eq!(
            error2.to_string(),
            "Malformed run file name: recs-abc.parquet"
        );

        let error3 = Error::MissingTruth {
            partition: 3,
            path: PathBuf::from("data-split/ml/test-3.parquet"),
        };
        assert_eq!(
            error3.to_string(),
            "Missing truth file for partition 3: data-split/ml/test-3.parquet"
        );
    }

    #[test]
    fn test_error_is_config() {
        assert!(Error::Config("bad".to_owned()).is_config());
        assert!(!Error::UnknownDataset("ml-1m".to_owned()).is_config());
        assert!(!Error::RunFileName("x".to_owned()).is_config());
    }

    #[test]
    fn test_error_from_io() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io(_)));
    }
}
