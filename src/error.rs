use std::path::PathBuf;

use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// Everything that can abort a run. No stage recovers from any of these.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("root path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("root path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A recording file could not be decoded. The cause is a `ParquetError`
    /// from the reader or an `ArrowError` from reading or stitching its batches.
    #[error("failed to decode '{}': {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Two recordings disagree on a column type that cannot be widened.
    #[error("column '{column}' has incompatible types {left:?} and {right:?}")]
    SchemaMismatch {
        column: String,
        left: DataType,
        right: DataType,
    },

    #[error(transparent)]
    Arrow(#[from] ArrowError),

    #[error("no recording files found under {}", .0.display())]
    NoInputFiles(PathBuf),

    #[error("missing columns: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("feature column '{column}' is not numeric ({data_type:?})")]
    NonNumericFeature { column: String, data_type: DataType },

    /// Every value of a feature column is missing, so there is no median.
    #[error("feature column '{column}' has no observed values; median is undefined")]
    UndefinedMedian { column: String },

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: ParquetError,
    },

    #[error("failed to write console report: {0}")]
    Console(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
