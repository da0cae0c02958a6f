//! Consolidates per-subject acoustic feature recordings into one dataset.
//!
//! Recordings live as Parquet files in `NF*` / `PF*` subject folders. The
//! pipeline stacks them into one table, keeps a fixed set of columns, writes
//! that table, fills missing feature values with per-column medians, and
//! writes the result again.
//!
//! ```no_run
//! use voice_merge::{PipelineConfig, pipeline};
//!
//! let output = pipeline::run(&PipelineConfig::default()).unwrap();
//! println!("{} rows", output.imputed.num_rows());
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;

pub use config::{EmptyFeaturePolicy, PipelineConfig};
pub use error::PipelineError;
