use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use voice_merge::{EmptyFeaturePolicy, PipelineConfig, pipeline};

#[derive(Parser)]
#[command(name = "voice-merge")]
#[command(about = "Merge per-subject acoustic feature files and median-impute missing features", version)]
struct Cli {
    /// JSON config file; missing keys fall back to defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory containing the NF*/PF* subject folders
    #[arg(long)]
    root: Option<PathBuf>,

    /// Output file for the projected, non-imputed table
    #[arg(long)]
    raw_output: Option<PathBuf>,

    /// Output file for the imputed table
    #[arg(long)]
    imputed_output: Option<PathBuf>,

    /// What to do with a feature column that has no observed values
    #[arg(long, value_enum)]
    empty_feature: Option<EmptyFeaturePolicy>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .parse_default_env()
        .init();

    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            PipelineConfig::from_json(path)?
        }
        None => PipelineConfig::default(),
    };
    if let Some(root) = cli.root {
        config.root = root;
    }
    if let Some(raw_output) = cli.raw_output {
        config.raw_output = raw_output;
    }
    if let Some(imputed_output) = cli.imputed_output {
        config.imputed_output = imputed_output;
    }
    if let Some(policy) = cli.empty_feature {
        config.empty_feature = policy;
    }
    config.validate().context("invalid configuration")?;

    let output = pipeline::run(&config).context("pipeline run failed")?;
    info!(
        "Done: {} file(s), {} row(s) written to {} and {}",
        output.file_count,
        output.imputed.num_rows(),
        config.raw_output.display(),
        config.imputed_output.display()
    );
    Ok(())
}
