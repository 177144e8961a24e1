//! Whole-column extraction from Arrow record batches
//!
//! Each extractor returns `Ok(None)` for an optional column that is absent
//! and one `Option` per row otherwise.

use arrow::array::{Array, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::utils::arrow::array_utils::{downcast_array, get_column};

/// Extract a column as `f64`, non-numeric values becoming `None`
pub fn f64_column(
    batch: &RecordBatch,
    column_name: &str,
    required: bool,
    table: &str,
) -> Result<Option<Vec<Option<f64>>>> {
    let Some(array) = get_column(batch, column_name, &DataType::Float64, required, table)? else {
        return Ok(None);
    };
    let values = downcast_array::<Float64Array>(&array, column_name, "Float64")?;
    Ok(Some(
        values
            .iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect(),
    ))
}

/// Extract a column as `i64`
///
/// Floating-point columns holding whole numbers (common for identifiers in
/// statistical exports) are accepted; fractional or non-finite values
/// become `None`.
pub fn i64_column(
    batch: &RecordBatch,
    column_name: &str,
    required: bool,
    table: &str,
) -> Result<Option<Vec<Option<i64>>>> {
    let Ok(idx) = batch.schema().index_of(column_name) else {
        return get_column(batch, column_name, &DataType::Int64, required, table).map(|_| None);
    };
    if matches!(
        batch.column(idx).data_type(),
        DataType::Float16 | DataType::Float32 | DataType::Float64
    ) {
        let floats = f64_column(batch, column_name, required, table)?.unwrap_or_default();
        return Ok(Some(
            floats
                .into_iter()
                .map(|v| v.filter(|x| x.is_finite() && x.fract() == 0.0).map(|x| x as i64))
                .collect(),
        ));
    }

    let Some(array) = get_column(batch, column_name, &DataType::Int64, required, table)? else {
        return Ok(None);
    };
    let values = downcast_array::<Int64Array>(&array, column_name, "Int64")?;
    Ok(Some(values.iter().collect()))
}

/// Extract a column as text
pub fn string_column(
    batch: &RecordBatch,
    column_name: &str,
    required: bool,
    table: &str,
) -> Result<Option<Vec<Option<String>>>> {
    let Some(array) = get_column(batch, column_name, &DataType::Utf8, required, table)? else {
        return Ok(None);
    };
    let values = downcast_array::<StringArray>(&array, column_name, "String")?;
    Ok(Some(
        values.iter().map(|v| v.map(str::to_string)).collect(),
    ))
}

/// Extract a column as `bool`
pub fn bool_column(
    batch: &RecordBatch,
    column_name: &str,
    required: bool,
    table: &str,
) -> Result<Option<Vec<Option<bool>>>> {
    let Some(array) = get_column(batch, column_name, &DataType::Boolean, required, table)? else {
        return Ok(None);
    };
    let values = downcast_array::<BooleanArray>(&array, column_name, "Boolean")?;
    Ok(Some(values.iter().collect()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{ArrayRef, Float64Array, StringArray};
    use arrow::record_batch::RecordBatch;

    use super::*;

    fn batch() -> RecordBatch {
        RecordBatch::try_from_iter(vec![
            (
                "SEQN",
                Arc::new(Float64Array::from(vec![Some(1.0), Some(2.5), None])) as ArrayRef,
            ),
            (
                "LBXSAL",
                Arc::new(StringArray::from(vec![Some("4.1"), Some("n/a"), Some("3.9")]))
                    as ArrayRef,
            ),
        ])
        .unwrap()
    }

    #[test]
    fn text_coerces_to_numbers_leniently() {
        let values = f64_column(&batch(), "LBXSAL", true, "test").unwrap().unwrap();
        assert_eq!(values, vec![Some(4.1), None, Some(3.9)]);
    }

    #[test]
    fn float_identifiers_become_integers() {
        let ids = i64_column(&batch(), "SEQN", true, "test").unwrap().unwrap();
        assert_eq!(ids, vec![Some(1), None, None]);
    }

    #[test]
    fn missing_columns() {
        assert!(f64_column(&batch(), "NOPE", false, "test").unwrap().is_none());
        assert!(i64_column(&batch(), "NOPE", false, "test").unwrap().is_none());
        assert!(string_column(&batch(), "NOPE", true, "test").is_err());
    }
}
