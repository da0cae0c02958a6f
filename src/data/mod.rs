//! Data layer: discovery, loading, projection, imputation and output.
//!
//! Architecture:
//! ```text
//!  <root>/NF*/*.parquet, <root>/PF*/*.parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ scanner  │  subject folders → recording paths (sorted)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  decode each file, union-concat → one RecordBatch
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ projector │  fixed column list, in order  ──▶ writer (raw)
//!   └───────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ imputer  │  per-column median fill      ──▶ writer (imputed)
//!   └──────────┘
//! ```

pub mod imputer;
pub mod loader;
pub mod model;
pub mod projector;
pub mod report;
pub mod scanner;
pub mod writer;

#[cfg(test)]
pub(crate) mod fixtures;
