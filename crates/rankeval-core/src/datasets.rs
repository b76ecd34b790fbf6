//! Registry mapping dataset names to interaction tables on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::RankevalConfig;
use crate::error::{Error, Result};
use crate::table;
use crate::types::Interaction;

/// On-disk encoding of an interaction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    /// Apache Parquet
    Parquet,
    /// Delimited text
    Csv,
}

/// Where a dataset's interactions live and how to read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSource {
    /// Interaction table location
    pub path: PathBuf,
    /// Encoding; inferred from the file extension when absent
    #[serde(default)]
    pub format: Option<TableFormat>,
    /// Field delimiter for CSV input
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Whether CSV input starts with a header row
    #[serde(default = "default_has_header")]
    pub has_header: bool,
    /// Column holding user ids
    #[serde(default = "default_user_column")]
    pub user_column: String,
    /// Column holding item ids
    #[serde(default = "default_item_column")]
    pub item_column: String,
    /// Column holding ratings; ignored when absent from the table
    #[serde(default = "default_rating_column")]
    pub rating_column: String,
    /// Column holding timestamps; ignored when absent from the table
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: String,
}

fn default_delimiter() -> char {
    ','
}

fn default_has_header() -> bool {
    true
}

fn default_user_column() -> String {
    "user".to_owned()
}

fn default_item_column() -> String {
    "item".to_owned()
}

fn default_rating_column() -> String {
    "rating".to_owned()
}

fn default_timestamp_column() -> String {
    "timestamp".to_owned()
}

impl DatasetSource {
    /// Source with default column names, format inferred from the extension.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: None,
            delimiter: default_delimiter(),
            has_header: default_has_header(),
            user_column: default_user_column(),
            item_column: default_item_column(),
            rating_column: default_rating_column(),
            timestamp_column: default_timestamp_column(),
        }
    }

    /// Effective table format.
    pub fn resolved_format(&self) -> TableFormat {
        self.format.unwrap_or_else(|| infer_format(&self.path))
    }
}

fn infer_format(path: &Path) -> TableFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("csv" | "tsv" | "txt" | "data" | "dat") => TableFormat::Csv,
        _ => TableFormat::Parquet,
    }
}

/// Named datasets available for splitting.
#[derive(Debug, Clone, Default)]
pub struct DatasetRegistry {
    sources: BTreeMap<String, DatasetSource>,
}

impl DatasetRegistry {
    /// Registry over the given sources.
    pub fn new(sources: BTreeMap<String, DatasetSource>) -> Self {
        Self { sources }
    }

    /// Registry declared in the `[datasets]` section of a config.
    pub fn from_config(config: &RankevalConfig) -> Self {
        Self::new(config.datasets.clone())
    }

    /// Add or replace a dataset.
    #[must_use]
    pub fn with_dataset(mut self, name: &str, source: DatasetSource) -> Self {
        self.sources.insert(name.to_owned(), source);
        self
    }

    /// Source of a named dataset.
    ///
    /// # Errors
    /// Returns [`Error::UnknownDataset`] if the name is not registered
    pub fn source(&self, name: &str) -> Result<&DatasetSource> {
        self.sources
            .get(name)
            .ok_or_else(|| Error::UnknownDataset(name.to_owned()))
    }

    /// Registered dataset names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    /// Load every interaction of a named dataset.
    ///
    /// # Errors
    /// Returns an error if the dataset is unknown or its table cannot be read
    pub fn load(&self, name: &str) -> Result<Vec<Interaction>> {
        let source = self.source(name)?;
        info!("loading ratings for {name} from {}", source.path.display());
        table::read_interactions(source)
    }
}
