//! Run configuration: input root, output paths, and the column lists.
//!
//! Every field has a default matching the layout of the voice dataset, so an
//! empty JSON object (or no file at all) reproduces the standard run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Columns kept in both output files, in output order.
pub const DEFAULT_COLUMNS: [&str; 21] = [
    "ts",
    "subject_id",
    "week",
    "date",
    "cppall",
    "zcrall",
    "normpeakall",
    "spectralTiltall",
    "LHratioall",
    "H1H2all",
    "periodicity",
    "level",
    "freq",
    "dBcms2",
    "cppall_2048",
    "acflow",
    "mfdr",
    "oq",
    "naq",
    "h1h2",
    "voicedRMS",
];

/// Numeric acoustic features that get median-imputed.
pub const DEFAULT_FEATURES: [&str; 16] = [
    "cppall",
    "zcrall",
    "normpeakall",
    "spectralTiltall",
    "LHratioall",
    "H1H2all",
    "periodicity",
    "level",
    "freq",
    "dBcms2",
    "cppall_2048",
    "acflow",
    "mfdr",
    "oq",
    "naq",
    "h1h2",
];

/// What to do with a feature column that has no observed values at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyFeaturePolicy {
    /// Abort the run with `UndefinedMedian`.
    #[default]
    Fail,
    /// Leave the column entirely missing.
    KeepMissing,
    /// Fill the column with 0.0.
    Zero,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding the `NF*` / `PF*` subject folders.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Output for the projected, non-imputed table.
    #[serde(default = "default_raw_output")]
    pub raw_output: PathBuf,

    /// Output for the imputed table.
    #[serde(default = "default_imputed_output")]
    pub imputed_output: PathBuf,

    #[serde(default = "default_folder_prefixes")]
    pub folder_prefixes: Vec<String>,

    /// File name suffix of recording files, dot included.
    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default = "default_columns")]
    pub columns: Vec<String>,

    #[serde(default = "default_features")]
    pub features: Vec<String>,

    #[serde(default)]
    pub empty_feature: EmptyFeaturePolicy,

    /// Rows shown in the console preview.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

fn default_root() -> PathBuf {
    PathBuf::from("parquets/no_wind/sujetos")
}

fn default_raw_output() -> PathBuf {
    PathBuf::from("parquets/no_wind/all_data.parquet")
}

fn default_imputed_output() -> PathBuf {
    PathBuf::from("parquets/no_wind/all_data_imputed.parquet")
}

fn default_folder_prefixes() -> Vec<String> {
    vec!["NF".to_string(), "PF".to_string()]
}

fn default_extension() -> String {
    ".parquet".to_string()
}

fn default_columns() -> Vec<String> {
    DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect()
}

fn default_features() -> Vec<String> {
    DEFAULT_FEATURES.iter().map(|c| c.to_string()).collect()
}

fn default_preview_rows() -> usize {
    5
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            raw_output: default_raw_output(),
            imputed_output: default_imputed_output(),
            folder_prefixes: default_folder_prefixes(),
            extension: default_extension(),
            columns: default_columns(),
            features: default_features(),
            empty_feature: EmptyFeaturePolicy::default(),
            preview_rows: default_preview_rows(),
        }
    }
}

impl PipelineConfig {
    /// Load a (possibly partial) configuration from a JSON file.
    pub fn from_json(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: PipelineConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            bail!("column list is empty");
        }
        if self.folder_prefixes.is_empty() {
            bail!("no subject folder prefixes configured");
        }
        if self.raw_output == self.imputed_output {
            bail!(
                "raw and imputed outputs point at the same file: {}",
                self.raw_output.display()
            );
        }
        let stray: Vec<&str> = self
            .features
            .iter()
            .filter(|f| !self.columns.contains(f))
            .map(String::as_str)
            .collect();
        if !stray.is_empty() {
            bail!("features not in the column list: {}", stray.join(", "));
        }
        Ok(())
    }
}
