//! Parquet file operations
//!
//! Reads Parquet files into Arrow record batches, optionally projected to a
//! subset of columns, and writes serializable records as Parquet tables.

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use arrow::datatypes::{Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use arrow_schema::FieldRef;
use itertools::Itertools;
use parquet::arrow::ArrowWriter;
use parquet::arrow::{ProjectionMask, arrow_reader::ParquetRecordBatchReaderBuilder};
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::{Deserialize, Serialize};
use serde_arrow::schema::{SchemaLike, TracingOptions};

use crate::error::{BiomarkerError, Result};
use crate::error::util::safe_open_file;
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Helper function to get batch size from environment
#[must_use]
pub fn get_batch_size() -> Option<usize> {
    std::env::var("PARQUET_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n > 0)
}

/// Build a projection mask for the requested columns
///
/// Columns missing from the file are skipped. Returns `None` when none of
/// the requested columns exist.
#[must_use]
pub fn create_projection(
    columns: &[&str],
    file_schema: &Schema,
    parquet_schema: &parquet::schema::types::SchemaDescriptor,
) -> Option<ProjectionMask> {
    let indices = columns
        .iter()
        .filter_map(|name| file_schema.index_of(name).ok())
        .unique()
        .sorted()
        .collect_vec();

    if indices.is_empty() {
        None
    } else {
        Some(ProjectionMask::roots(parquet_schema, indices))
    }
}

/// Read the Arrow schema of a parquet file without decoding any rows
pub fn read_parquet_schema(path: &Path) -> Result<SchemaRef> {
    let file = safe_open_file(path, "parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    Ok(builder.schema().clone())
}

/// Read a parquet file into Arrow record batches
///
/// # Arguments
/// * `path` - Path to the Parquet file
/// * `columns` - Optional column names to project; unknown names are ignored
/// * `batch_size` - Rows per record batch
pub fn read_parquet(
    path: &Path,
    columns: Option<&[&str]>,
    batch_size: usize,
) -> Result<Vec<RecordBatch>> {
    let start = Instant::now();
    log_operation_start("Reading parquet file", path);

    let file = safe_open_file(path, "parquet file")?;
    let reader_builder =
        ParquetRecordBatchReaderBuilder::try_new(file)?.with_batch_size(batch_size.max(1));

    let reader = match columns {
        Some(columns) => {
            match create_projection(
                columns,
                reader_builder.schema(),
                reader_builder.parquet_schema(),
            ) {
                Some(mask) => reader_builder.with_projection(mask).build()?,
                None => {
                    log_warning("None of the requested columns exist", Some(path));
                    return Ok(Vec::new());
                }
            }
        }
        None => reader_builder.build()?,
    };

    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    log_operation_complete("read", path, batches.len(), Some(start.elapsed()));
    Ok(batches)
}

/// Arrow fields for a record type, traced from its serde definition
pub fn record_fields<T>() -> Result<Vec<FieldRef>>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    let fields = Vec::<FieldRef>::from_type::<T>(
        TracingOptions::default()
            .allow_null_fields(true)
            .enums_without_data_as_strings(true),
    )?;
    Ok(fields)
}

/// Convert records into a single record batch
pub fn records_to_batch<T>(records: &[T]) -> Result<RecordBatch>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    let fields = record_fields::<T>()?;
    Ok(serde_arrow::to_record_batch(&fields, &records)?)
}

/// Write records as a Parquet table
///
/// An empty slice still produces a file carrying the record schema.
pub fn write_records<T>(path: &Path, records: &[T]) -> Result<()>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    let start = Instant::now();
    let batch = records_to_batch(records)?;

    let file = File::create(path).map_err(|e| {
        BiomarkerError::io_error_with_source(
            format!("Failed to create output file {}", path.display()),
            e,
        )
        .with_path(path)
    })?;
    let properties = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(properties))?;
    if batch.num_rows() > 0 {
        writer.write(&batch)?;
    }
    writer.close()?;

    log_operation_complete("wrote", path, records.len(), Some(start.elapsed()));
    Ok(())
}
