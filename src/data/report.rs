use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

use super::model::{MissingCounts, TableShape};
use crate::error::Result;

/// First line of the console report.
pub fn summary_line(file_count: usize, shape: TableShape) -> String {
    format!("Concatenated {file_count} files. Final shape: {shape}")
}

/// The first `rows` rows, pretty-printed as a table.
pub fn preview(table: &RecordBatch, rows: usize) -> Result<String> {
    let head = table.slice(0, rows.min(table.num_rows()));
    Ok(pretty_format_batches(&[head])?.to_string())
}

/// Missing cells per column of `columns`, nulls and float NaNs alike.
/// Columns absent from `table` are skipped.
pub fn missing_counts(table: &RecordBatch, columns: &[String]) -> Result<MissingCounts> {
    let mut entries = Vec::with_capacity(columns.len());
    for name in columns {
        let Some(column) = table.column_by_name(name) else {
            continue;
        };
        let count = match column.data_type() {
            DataType::Null => column.len(),
            DataType::Float16 | DataType::Float32 | DataType::Float64 => {
                let values = cast(column, &DataType::Float64)?;
                values
                    .as_primitive::<Float64Type>()
                    .iter()
                    .filter(|v| v.map_or(true, f64::is_nan))
                    .count()
            }
            _ => column.null_count(),
        };
        entries.push((name.clone(), count));
    }
    Ok(MissingCounts { entries })
}
