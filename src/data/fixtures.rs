//! Test helpers: small recording tables and Parquet files on disk.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use crate::config::{DEFAULT_COLUMNS, DEFAULT_FEATURES};

/// A recording with all 21 dataset columns plus an unrelated `wind_flag`
/// column. Every feature column holds `values`; row count is `values.len()`.
pub fn recording(subject: &str, values: &[Option<f64>]) -> RecordBatch {
    let n = values.len();
    let mut fields = Vec::new();
    let mut columns: Vec<ArrayRef> = Vec::new();

    for name in DEFAULT_COLUMNS {
        let (dt, array): (DataType, ArrayRef) = match name {
            "ts" => (
                DataType::Float64,
                Arc::new(Float64Array::from_iter_values((0..n).map(|i| 1000.0 + i as f64))),
            ),
            "subject_id" => (
                DataType::Utf8,
                Arc::new(StringArray::from(vec![subject; n])),
            ),
            "week" => (
                DataType::Int64,
                Arc::new(Int64Array::from_iter_values((0..n).map(|i| i as i64 % 4))),
            ),
            "date" => (
                DataType::Utf8,
                Arc::new(StringArray::from(vec!["2024-03-01"; n])),
            ),
            _ if DEFAULT_FEATURES.contains(&name) => (
                DataType::Float64,
                Arc::new(Float64Array::from(values.to_vec())),
            ),
            _ => (
                DataType::Float64,
                Arc::new(Float64Array::from_iter_values((0..n).map(|i| 0.5 * i as f64))),
            ),
        };
        fields.push(Field::new(name, dt, true));
        columns.push(array);
    }

    fields.push(Field::new("wind_flag", DataType::Boolean, true));
    columns.push(Arc::new(BooleanArray::from(vec![false; n])));

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).unwrap()
}

/// A batch with a single Float64 column.
pub fn float_column(name: &str, values: &[Option<f64>]) -> RecordBatch {
    let schema = Schema::new(vec![Field::new(name, DataType::Float64, true)]);
    RecordBatch::try_new(
        Arc::new(schema),
        vec![Arc::new(Float64Array::from(values.to_vec()))],
    )
    .unwrap()
}

/// Write `batch` as a Parquet file, creating parent directories.
pub fn write_parquet(path: &Path, batch: &RecordBatch) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let file = std::fs::File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(batch).unwrap();
    writer.close().unwrap();
}
