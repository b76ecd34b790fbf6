//! Typed column extraction from Arrow record batches.

use std::path::Path;

use arrow::array::{
    Array as _, ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray, UInt32Array,
};
use arrow::compute::cast;
use arrow::datatypes::DataType;

use crate::error::{Error, Result};

pub(super) fn invalid(path: &Path, reason: String) -> Error {
    Error::InvalidTable {
        path: path.to_path_buf(),
        reason,
    }
}

fn cast_column(batch: &RecordBatch, name: &str, to: &DataType) -> Result<Option<ArrayRef>> {
    Ok(batch
        .column_by_name(name)
        .map(|column| cast(column, to))
        .transpose()?)
}

fn required(batch: &RecordBatch, name: &str, to: &DataType, path: &Path) -> Result<ArrayRef> {
    let column = cast_column(batch, name, to)?
        .ok_or_else(|| invalid(path, format!("missing column `{name}`")))?;
    if column.null_count() > 0 {
        return Err(invalid(path, format!("column `{name}` contains nulls")));
    }
    Ok(column)
}

fn wrong_type(path: &Path, name: &str) -> Error {
    invalid(path, format!("column `{name}` has an unsupported type"))
}

/// Non-null integer column, converted to `i64`.
pub(super) fn required_i64(batch: &RecordBatch, name: &str, path: &Path) -> Result<Vec<i64>> {
    let column = required(batch, name, &DataType::Int64, path)?;
    let values = column
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| wrong_type(path, name))?;
    Ok(values.values().to_vec())
}

/// Non-null integer column, converted to `u32`.
pub(super) fn required_u32(batch: &RecordBatch, name: &str, path: &Path) -> Result<Vec<u32>> {
    let column = required(batch, name, &DataType::UInt32, path)?;
    let values = column
        .as_any()
        .downcast_ref::<UInt32Array>()
        .ok_or_else(|| wrong_type(path, name))?;
    Ok(values.values().to_vec())
}

/// Non-null string column.
pub(super) fn required_str(batch: &RecordBatch, name: &str, path: &Path) -> Result<Vec<String>> {
    let column = required(batch, name, &DataType::Utf8, path)?;
    let values = column
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| wrong_type(path, name))?;
    Ok(values
        .iter()
        .map(|value| value.unwrap_or_default().to_owned())
        .collect())
}

/// Nullable float column; `None` when the column is absent.
pub(super) fn optional_f64(
    batch: &RecordBatch,
    name: &str,
    path: &Path,
) -> Result<Option<Vec<Option<f64>>>> {
    let Some(column) = cast_column(batch, name, &DataType::Float64)? else {
        return Ok(None);
    };
    let values = column
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| wrong_type(path, name))?;
    Ok(Some(values.iter().collect()))
}

/// Nullable integer column; `None` when the column is absent.
pub(super) fn optional_i64(
    batch: &RecordBatch,
    name: &str,
    path: &Path,
) -> Result<Option<Vec<Option<i64>>>> {
    let Some(column) = cast_column(batch, name, &DataType::Int64)? else {
        return Ok(None);
    };
    let values = column
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| wrong_type(path, name))?;
    Ok(Some(values.iter().collect()))
}
