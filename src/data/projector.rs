use arrow::record_batch::RecordBatch;
use log::info;

use crate::error::{PipelineError, Result};

/// Keep exactly `columns`, in that order, and drop everything else.
///
/// Fails with `MissingColumns` naming every absent column; there is no
/// partial projection.
pub fn project(table: &RecordBatch, columns: &[String]) -> Result<RecordBatch> {
    let schema = table.schema();
    let mut indices = Vec::with_capacity(columns.len());
    let mut missing = Vec::new();

    for name in columns {
        match schema.index_of(name) {
            Ok(i) => indices.push(i),
            Err(_) => missing.push(name.clone()),
        }
    }
    if !missing.is_empty() {
        return Err(PipelineError::MissingColumns { columns: missing });
    }

    let projected = table.project(&indices)?;
    info!(
        "Projected {} of {} column(s)",
        projected.num_columns(),
        table.num_columns()
    );
    Ok(projected)
}
