//! Utilities for working with Arrow arrays.

use arrow::array::{Array, ArrayRef};
use arrow::compute::kernels::cast::{CastOptions, cast_with_options};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use log::trace;

use crate::error::{BiomarkerError, Result};

/// Get a column from a record batch, cast to the expected type
///
/// Casting is lenient: values that cannot be represented in the target type
/// become null, the way numeric coercion of a text column would.
///
/// # Arguments
///
/// * `batch` - The record batch containing the column
/// * `column_name` - The name of the column to extract
/// * `expected_type` - The data type the caller wants
/// * `required` - Whether a missing column is an error or `Ok(None)`
/// * `table` - Name of the table, used in error messages
pub fn get_column(
    batch: &RecordBatch,
    column_name: &str,
    expected_type: &DataType,
    required: bool,
    table: &str,
) -> Result<Option<ArrayRef>> {
    let Ok(idx) = batch.schema().index_of(column_name) else {
        if required {
            return Err(BiomarkerError::column_not_found(column_name, table));
        }
        return Ok(None);
    };

    let column = batch.column(idx);
    let actual_type = column.data_type();
    if actual_type == expected_type {
        return Ok(Some(column.clone()));
    }

    trace!("Casting column '{column_name}' from {actual_type:?} to {expected_type:?}");
    let options = CastOptions {
        safe: true,
        ..CastOptions::default()
    };
    let converted = cast_with_options(column, expected_type, &options)?;
    Ok(Some(converted))
}

/// Downcast a column to a specific array type with a clear error message
pub fn downcast_array<'a, T: Array + 'static>(
    array: &'a ArrayRef,
    column_name: &str,
    expected: &str,
) -> Result<&'a T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        BiomarkerError::Schema(format!("Column '{column_name}' is not a {expected} array"))
    })
}
