use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, new_null_array};
use arrow::compute::{cast, concat_batches};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use log::{debug, info};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::SubjectFolder;
use crate::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// Single recording
// ---------------------------------------------------------------------------

/// Decode one Parquet recording into a single record batch.
///
/// Works with files written by **Pandas** (`df.to_parquet()`) as well as by
/// arrow-rs; a pandas index column, if present, simply comes along as an
/// extra column and is dropped later by the projection.
pub fn read_recording(path: &Path) -> Result<RecordBatch> {
    let decode_err = |source: Box<dyn std::error::Error + Send + Sync>| PipelineError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::open(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| decode_err(Box::new(e)))?;
    let schema = builder.schema().clone();
    let reader = builder.build().map_err(|e| decode_err(Box::new(e)))?;

    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch.map_err(|e| decode_err(Box::new(e)))?);
    }

    let batch = concat_batches(&schema, &batches).map_err(|e| decode_err(Box::new(e)))?;
    debug!("{}: {} row(s)", path.display(), batch.num_rows());
    Ok(batch)
}

/// Read every recording of every folder, in scan order, and concatenate.
///
/// Returns the consolidated table and the number of files read.
pub fn load_folders(folders: &[SubjectFolder]) -> Result<(RecordBatch, usize)> {
    let mut batches = Vec::new();
    for folder in folders {
        debug!("Loading {} from {}", folder.name, folder.path.display());
        for path in &folder.recordings {
            batches.push(read_recording(path)?);
        }
    }
    let file_count = batches.len();
    let table = concat_recordings(&batches)?;
    info!(
        "Concatenated {file_count} recording(s) into {} row(s), {} column(s)",
        table.num_rows(),
        table.num_columns()
    );
    Ok((table, file_count))
}

// ---------------------------------------------------------------------------
// Concatenation
// ---------------------------------------------------------------------------

/// Stack recordings row-wise into one table.
///
/// The result schema is the union of the input schemas, columns ordered by
/// first appearance. Rows from a recording that lacks a column get nulls in
/// it. A column stored with different numeric types across recordings is
/// widened to `Float64`. No input gives an empty table with no columns.
pub fn concat_recordings(batches: &[RecordBatch]) -> Result<RecordBatch> {
    let schema = union_schema(batches)?;
    let aligned = batches
        .iter()
        .map(|b| align_to(b, &schema))
        .collect::<Result<Vec<_>>>()?;
    Ok(concat_batches(&schema, &aligned)?)
}

fn union_schema(batches: &[RecordBatch]) -> Result<SchemaRef> {
    let mut order: Vec<(String, DataType)> = Vec::new();
    let mut index: BTreeMap<String, usize> = BTreeMap::new();

    for batch in batches {
        for field in batch.schema().fields() {
            match index.get(field.name()) {
                Some(&i) => {
                    let current = &order[i].1;
                    let widened = widen(current, field.data_type()).ok_or_else(|| {
                        PipelineError::SchemaMismatch {
                            column: field.name().clone(),
                            left: current.clone(),
                            right: field.data_type().clone(),
                        }
                    })?;
                    order[i].1 = widened;
                }
                None => {
                    index.insert(field.name().clone(), order.len());
                    order.push((field.name().clone(), field.data_type().clone()));
                }
            }
        }
    }

    let fields: Vec<Field> = order
        .into_iter()
        .map(|(name, dt)| Field::new(name, dt, true))
        .collect();
    Ok(Arc::new(Schema::new(fields)))
}

/// The type both `a` and `b` can be losslessly-enough stored as, if any.
fn widen(a: &DataType, b: &DataType) -> Option<DataType> {
    if a == b {
        return Some(a.clone());
    }
    match (a, b) {
        (DataType::Null, other) | (other, DataType::Null) => Some(other.clone()),
        // Categorical columns decay to their plain value type.
        (DataType::Dictionary(_, value), other) | (other, DataType::Dictionary(_, value)) => {
            widen(value, other)
        }
        (DataType::Utf8, DataType::LargeUtf8) | (DataType::LargeUtf8, DataType::Utf8) => {
            Some(DataType::LargeUtf8)
        }
        (DataType::Timestamp(u1, tz1), DataType::Timestamp(u2, tz2)) if tz1 == tz2 => {
            let unit = if unit_rank(u1) >= unit_rank(u2) { u1 } else { u2 };
            Some(DataType::Timestamp(*unit, tz1.clone()))
        }
        _ if a.is_numeric() && b.is_numeric() => Some(DataType::Float64),
        _ => None,
    }
}

/// Higher is finer.
fn unit_rank(unit: &TimeUnit) -> u8 {
    match unit {
        TimeUnit::Second => 0,
        TimeUnit::Millisecond => 1,
        TimeUnit::Microsecond => 2,
        TimeUnit::Nanosecond => 3,
    }
}

fn align_to(batch: &RecordBatch, schema: &SchemaRef) -> Result<RecordBatch> {
    let rows = batch.num_rows();
    let columns = schema
        .fields()
        .iter()
        .map(|field| {
            let target = field.data_type();
            let column: ArrayRef = match batch.column_by_name(field.name()) {
                Some(col) if col.data_type() == target => col.clone(),
                Some(col) if col.data_type() != &DataType::Null => cast(col, target)?,
                _ => new_null_array(target, rows),
            };
            Ok(column)
        })
        .collect::<Result<Vec<_>>>()?;

    let options = RecordBatchOptions::new().with_row_count(Some(rows));
    Ok(RecordBatch::try_new_with_options(
        schema.clone(),
        columns,
        &options,
    )?)
}
