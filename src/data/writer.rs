use std::fs::{self, File};
use std::path::Path;

use arrow::record_batch::RecordBatch;
use log::info;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::error::{PipelineError, Result};

/// Write `table` to `path` as a single Parquet file, replacing any existing
/// file. Parent directories are created as needed.
///
/// Snappy-compressed to match what pandas writes by default. Nothing
/// run-dependent goes into the file, so equal tables give equal bytes.
pub fn write_table(path: &Path, table: &RecordBatch) -> Result<()> {
    let io_err = |source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    };
    let write_err = |source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = File::create(path).map_err(io_err)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, table.schema(), Some(props)).map_err(write_err)?;
    writer.write(table).map_err(write_err)?;
    writer.close().map_err(write_err)?;

    info!(
        "Wrote {} row(s) x {} column(s) to {}",
        table.num_rows(),
        table.num_columns(),
        path.display()
    );
    Ok(())
}
