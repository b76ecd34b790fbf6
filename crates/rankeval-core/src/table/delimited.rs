//! Delimited-text input for interaction tables.

use std::fs::File;
use std::io::Seek as _;
use std::path::Path;
use std::sync::Arc;

use arrow::array::RecordBatch;
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;

use super::columns::invalid;
use crate::datasets::DatasetSource;
use crate::error::Result;

/// Rows sampled for schema inference.
const INFER_ROWS: usize = 10_000;

/// Read a delimited file into record batches, inferring column types.
pub(super) fn read_batches(source: &DatasetSource) -> Result<Vec<RecordBatch>> {
    let path: &Path = &source.path;
    let delimiter = u8::try_from(source.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| invalid(path, format!("delimiter {:?} is not ASCII", source.delimiter)))?;

    let mut file = File::open(path)?;
    let format = Format::default()
        .with_header(source.has_header)
        .with_delimiter(delimiter);
    let (schema, _) = format.infer_schema(&mut file, Some(INFER_ROWS))?;
    file.rewind()?;

    let reader = ReaderBuilder::new(Arc::new(schema))
        .with_header(source.has_header)
        .with_delimiter(delimiter)
        .build(file)?;

    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch?);
    }
    Ok(batches)
}
