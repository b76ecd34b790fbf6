//! Parquet and CSV codec for interaction, recommendation, truth, and score tables.
//!
//! Every artifact is written as a single Parquet file compressed with brotli. Writes go to a
//! sibling temporary file that is renamed into place once complete, so a reader never sees a
//! partially written artifact.

mod columns;
mod delimited;

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray, UInt32Array, UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::{BrotliLevel, Compression};
use parquet::file::properties::WriterProperties;
use tracing::debug;

use crate::datasets::{DatasetSource, TableFormat};
use crate::error::{Error, Result};
use crate::recs::RecTable;
use crate::scores::{PartitionScore, ScoreTable};
use crate::truth::TruthTable;
use crate::types::{Interaction, PartitionId, RecRow, TruthRow};
use columns::{invalid, optional_f64, optional_i64, required_i64, required_str, required_u32};

/// Read every record batch of a Parquet file.
///
/// # Errors
/// Returns an error if the file cannot be opened or decoded
pub fn read_parquet(path: &Path) -> Result<Vec<RecordBatch>> {
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch?);
    }
    Ok(batches)
}

/// Write one record batch as a brotli-compressed Parquet file.
///
/// Parent directories are created as needed and the file appears atomically.
///
/// # Errors
/// Returns an error if the file cannot be encoded or written
pub fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let staging = staging_path(path);
    let written = encode_parquet(&staging, batch)
        .and_then(|()| fs::rename(&staging, path).map_err(Error::from));
    if let Err(err) = written {
        if let Err(cleanup) = fs::remove_file(&staging) {
            debug!("could not remove {}: {cleanup}", staging.display());
        }
        return Err(err);
    }

    debug!("wrote {} rows to {}", batch.num_rows(), path.display());
    Ok(())
}

fn encode_parquet(staging: &Path, batch: &RecordBatch) -> Result<()> {
    let props = WriterProperties::builder()
        .set_compression(Compression::BROTLI(BrotliLevel::default()))
        .build();
    let file = File::create(staging)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

/// Read a dataset's interactions according to its source description.
///
/// # Errors
/// Returns an error if the table cannot be read or lacks the user or item column
pub fn read_interactions(source: &DatasetSource) -> Result<Vec<Interaction>> {
    let batches = match source.resolved_format() {
        TableFormat::Parquet => read_parquet(&source.path)?,
        TableFormat::Csv => delimited::read_batches(source)?,
    };

    let mut interactions = Vec::new();
    let mut index = 0u64;
    for batch in &batches {
        let users = required_i64(batch, &source.user_column, &source.path)?;
        let items = required_i64(batch, &source.item_column, &source.path)?;
        let ratings = optional_f64(batch, &source.rating_column, &source.path)?;
        let timestamps = optional_i64(batch, &source.timestamp_column, &source.path)?;

        for (row, (user, item)) in users.into_iter().zip(items).enumerate() {
            interactions.push(Interaction {
                index,
                user,
                item,
                rating: ratings.as_ref().and_then(|values| values[row]),
                timestamp: timestamps.as_ref().and_then(|values| values[row]),
            });
            index += 1;
        }
    }
    Ok(interactions)
}

/// Write a held-out test set.
///
/// Columns are `index`, `user`, `item`, plus `rating` and `timestamp` when any row has one.
///
/// # Errors
/// Returns an error if the file cannot be written
pub fn write_test_set(path: &Path, rows: &[Interaction]) -> Result<()> {
    let mut fields = vec![
        Field::new("index", DataType::UInt64, false),
        Field::new("user", DataType::Int64, false),
        Field::new("item", DataType::Int64, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(UInt64Array::from_iter_values(rows.iter().map(|row| row.index))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|row| row.user))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|row| row.item))),
    ];
    if rows.iter().any(|row| row.rating.is_some()) {
        fields.push(Field::new("rating", DataType::Float64, true));
        columns.push(Arc::new(rows.iter().map(|row| row.rating).collect::<Float64Array>()));
    }
    if rows.iter().any(|row| row.timestamp.is_some()) {
        fields.push(Field::new("timestamp", DataType::Int64, true));
        columns.push(Arc::new(rows.iter().map(|row| row.timestamp).collect::<Int64Array>()));
    }

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
    write_parquet(path, &batch)
}

/// Read a truth table: `user`, `item`, and optional `rating` columns.
///
/// # Errors
/// Returns an error if the file cannot be read or lacks the user or item column
pub fn read_truth(path: &Path) -> Result<TruthTable> {
    let mut rows = Vec::new();
    for batch in &read_parquet(path)? {
        let users = required_i64(batch, "user", path)?;
        let items = required_i64(batch, "item", path)?;
        let ratings = optional_f64(batch, "rating", path)?;
        for (row, (user, item)) in users.into_iter().zip(items).enumerate() {
            rows.push(TruthRow {
                user,
                item,
                rating: ratings.as_ref().and_then(|values| values[row]),
            });
        }
    }
    Ok(TruthTable::from_rows(rows))
}

/// Write recommendation lists with `user`, `item`, and `rank` columns.
///
/// # Errors
/// Returns an error if the file cannot be written
pub fn write_recommendations(path: &Path, rows: &[RecRow]) -> Result<()> {
    let schema = Schema::new(vec![
        Field::new("user", DataType::Int64, false),
        Field::new("item", DataType::Int64, false),
        Field::new("rank", DataType::Int64, false),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|row| row.user))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|row| row.item))),
        Arc::new(Int64Array::from_iter_values(
            rows.iter().map(|row| i64::from(row.rank)),
        )),
    ];
    let batch = RecordBatch::try_new(Arc::new(schema), columns)?;
    write_parquet(path, &batch)
}

/// Read and validate a run's recommendation lists.
///
/// Any integer type is accepted for `rank`; extra columns such as `score` are ignored.
///
/// # Errors
/// Returns an error if the file cannot be read, lacks a required column, or breaks the
/// recommendation list contract
pub fn read_recommendations(path: &Path) -> Result<RecTable> {
    let mut rows = Vec::new();
    for batch in &read_parquet(path)? {
        let users = required_i64(batch, "user", path)?;
        let items = required_i64(batch, "item", path)?;
        let ranks = required_i64(batch, "rank", path)?;
        for ((user, item), rank) in users.into_iter().zip(items).zip(ranks) {
            let rank = u32::try_from(rank).map_err(|_| Error::InvalidRecommendations {
                user,
                reason: format!("rank {rank} is out of range"),
            })?;
            rows.push(RecRow { user, item, rank });
        }
    }
    RecTable::new(rows)
}

/// Write a score table with `partition`, `user`, `metric`, and nullable `score` columns.
///
/// # Errors
/// Returns an error if the file cannot be written
pub fn write_scores(path: &Path, table: &ScoreTable) -> Result<()> {
    let rows = table.rows();
    let schema = Schema::new(vec![
        Field::new("partition", DataType::UInt32, false),
        Field::new("user", DataType::Int64, false),
        Field::new("metric", DataType::Utf8, false),
        Field::new("score", DataType::Float64, true),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(UInt32Array::from_iter_values(
            rows.iter().map(|row| row.partition.get()),
        )),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|row| row.user))),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|row| row.metric.as_str()),
        )),
        Arc::new(rows.iter().map(|row| row.score).collect::<Float64Array>()),
    ];
    let batch = RecordBatch::try_new(Arc::new(schema), columns)?;
    write_parquet(path, &batch)
}

/// Read a score table written by [`write_scores`].
///
/// # Errors
/// Returns an error if the file cannot be read or lacks a required column
pub fn read_scores(path: &Path) -> Result<ScoreTable> {
    let mut rows = Vec::new();
    for batch in &read_parquet(path)? {
        let partitions = required_u32(batch, "partition", path)?;
        let users = required_i64(batch, "user", path)?;
        let metrics = required_str(batch, "metric", path)?;
        let scores = optional_f64(batch, "score", path)?
            .ok_or_else(|| invalid(path, "missing column `score`".to_owned()))?;
        for (((partition, user), metric), score) in
            partitions.into_iter().zip(users).zip(metrics).zip(scores)
        {
            rows.push(PartitionScore {
                partition: PartitionId(partition),
                user,
                metric,
                score,
            });
        }
    }
    Ok(ScoreTable::from_rows(rows))
}
