//! The end-to-end run: scan, load, project, persist, impute, persist.

use std::io::Write;

use arrow::record_batch::RecordBatch;
use log::info;

use crate::config::PipelineConfig;
use crate::data::imputer::{FittedMedians, MedianImputer};
use crate::data::model::{MissingCounts, TableShape, recording_count};
use crate::data::{loader, projector, report, scanner, writer};
use crate::error::{PipelineError, Result};

/// What a successful run produced.
#[derive(Debug)]
pub struct PipelineOutput {
    pub file_count: usize,
    /// Projected table as written to `raw_output`.
    pub raw: RecordBatch,
    /// Imputed table as written to `imputed_output`.
    pub imputed: RecordBatch,
    /// Missing cells per column, before imputation.
    pub missing: MissingCounts,
    pub medians: FittedMedians,
}

/// Run the pipeline, printing the console report to stdout.
pub fn run(config: &PipelineConfig) -> Result<PipelineOutput> {
    let stdout = std::io::stdout();
    run_with_output(config, &mut stdout.lock())
}

/// Run the pipeline, printing the console report to `out`.
///
/// Stages run strictly in order and the first error aborts the run. The raw
/// output is written (and the report printed) before imputation starts, so
/// a failed imputation still leaves the raw file behind.
pub fn run_with_output<W: Write>(config: &PipelineConfig, out: &mut W) -> Result<PipelineOutput> {
    let folders = scanner::scan(&config.root, &config.folder_prefixes, &config.extension)?;
    if recording_count(&folders) == 0 {
        return Err(PipelineError::NoInputFiles(config.root.clone()));
    }

    let (table, file_count) = loader::load_folders(&folders)?;
    let raw = projector::project(&table, &config.columns)?;
    writer::write_table(&config.raw_output, &raw)?;

    let missing = report::missing_counts(&raw, &config.columns)?;
    info!("{} missing cell(s) before imputation", missing.total());
    let summary = report::summary_line(file_count, TableShape::of(&raw));
    let head = report::preview(&raw, config.preview_rows)?;
    writeln!(out, "{summary}\n{head}\n{missing}").map_err(PipelineError::Console)?;

    let imputer = MedianImputer::new(config.features.clone(), config.empty_feature);
    let (imputed, medians) = imputer.fit_transform(&raw)?;
    for (name, median) in medians.iter() {
        info!("median {name} = {median:?}");
    }
    writer::write_table(&config.imputed_output, &imputed)?;

    Ok(PipelineOutput {
        file_count,
        raw,
        imputed,
        missing,
        medians,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_FEATURES, EmptyFeaturePolicy};
    use crate::data::fixtures::{recording, write_parquet};
    use crate::data::loader::read_recording;
    use arrow::array::Array;
    use std::fs;
    use std::path::Path;
    use tempfile::{TempDir, tempdir};

    fn config_for(dir: &Path) -> PipelineConfig {
        PipelineConfig {
            root: dir.join("sujetos"),
            raw_output: dir.join("out").join("all_data.parquet"),
            imputed_output: dir.join("out").join("all_data_imputed.parquet"),
            ..PipelineConfig::default()
        }
    }

    /// NF001 with one 2-row file and PF002 with one 3-row file.
    fn two_subjects() -> (TempDir, PipelineConfig) {
        let dir = tempdir().unwrap();
        let root = dir.path().join("sujetos");
        write_parquet(
            &root.join("NF001").join("week1.parquet"),
            &recording("NF001", &[Some(1.0), None]),
        );
        write_parquet(
            &root.join("PF002").join("week1.parquet"),
            &recording("PF002", &[Some(3.0), Some(7.0), None]),
        );
        let config = config_for(dir.path());
        (dir, config)
    }

    fn quiet_run(config: &PipelineConfig) -> Result<PipelineOutput> {
        run_with_output(config, &mut Vec::<u8>::new())
    }

    #[test]
    fn two_subject_scenario() {
        let (_dir, config) = two_subjects();
        let output = quiet_run(&config).unwrap();

        assert_eq!(output.file_count, 2);
        assert_eq!(output.raw.num_rows(), 5);
        assert_eq!(output.raw.num_columns(), 21);

        let raw_file = read_recording(&config.raw_output).unwrap();
        assert_eq!(raw_file.num_rows(), 5);
        assert_eq!(raw_file.num_columns(), 21);

        let imputed_file = read_recording(&config.imputed_output).unwrap();
        assert_eq!(imputed_file.num_rows(), 5);
        for name in DEFAULT_FEATURES {
            assert_eq!(imputed_file.column_by_name(name).unwrap().null_count(), 0);
            // median of [1, 3, 7]
            assert_eq!(output.medians.get(name), Some(3.0));
        }
    }

    #[test]
    fn non_feature_columns_match_between_outputs() {
        let (_dir, config) = two_subjects();
        quiet_run(&config).unwrap();

        let raw = read_recording(&config.raw_output).unwrap();
        let imputed = read_recording(&config.imputed_output).unwrap();
        for name in ["ts", "subject_id", "week", "date"] {
            assert_eq!(
                raw.column_by_name(name).unwrap().to_data(),
                imputed.column_by_name(name).unwrap().to_data(),
                "{name} differs"
            );
        }
    }

    #[test]
    fn report_is_printed_before_imputation() {
        let (_dir, config) = two_subjects();
        let mut console = Vec::new();
        let output = run_with_output(&config, &mut console).unwrap();

        let text = String::from_utf8(console).unwrap();
        assert!(text.starts_with("Concatenated 2 files. Final shape: (5, 21)"));
        assert!(text.contains("NF001"));
        assert_eq!(output.missing.get("cppall"), Some(2));
        assert_eq!(output.missing.get("subject_id"), Some(0));
        // two gaps in each of the 16 features, none elsewhere
        assert_eq!(output.missing.total(), 32);
    }

    #[test]
    fn rerun_gives_identical_files() {
        let (_dir, config) = two_subjects();
        quiet_run(&config).unwrap();
        let raw_first = fs::read(&config.raw_output).unwrap();
        let imputed_first = fs::read(&config.imputed_output).unwrap();

        quiet_run(&config).unwrap();
        assert_eq!(fs::read(&config.raw_output).unwrap(), raw_first);
        assert_eq!(fs::read(&config.imputed_output).unwrap(), imputed_first);
    }

    #[test]
    fn missing_root_aborts() {
        let dir = tempdir().unwrap();
        let err = quiet_run(&config_for(dir.path())).unwrap_err();
        assert!(matches!(err, PipelineError::PathNotFound(_)));
    }

    #[test]
    fn no_recordings_abort_before_writing() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        fs::create_dir_all(config.root.join("NF001")).unwrap();

        let err = quiet_run(&config).unwrap_err();
        assert!(matches!(err, PipelineError::NoInputFiles(_)));
        assert!(!config.raw_output.exists());
    }

    #[test]
    fn schema_drift_is_a_missing_column() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        write_parquet(
            &config.root.join("NF001").join("s.parquet"),
            &crate::data::fixtures::float_column("cppall", &[Some(1.0)]),
        );

        let err = quiet_run(&config).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumns { .. }));
        assert!(!config.raw_output.exists());
    }

    #[test]
    fn undefined_median_keeps_raw_output() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        write_parquet(
            &config.root.join("PF003").join("s.parquet"),
            &recording("PF003", &[None, None]),
        );

        let err = quiet_run(&config).unwrap_err();
        assert!(matches!(err, PipelineError::UndefinedMedian { .. }));
        assert!(config.raw_output.exists());
        assert!(!config.imputed_output.exists());
    }

    #[test]
    fn zero_policy_completes_all_missing_features() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig {
            empty_feature: EmptyFeaturePolicy::Zero,
            ..config_for(dir.path())
        };
        write_parquet(
            &config.root.join("PF003").join("s.parquet"),
            &recording("PF003", &[None, None]),
        );

        let output = quiet_run(&config).unwrap();
        assert_eq!(output.imputed.column_by_name("oq").unwrap().null_count(), 0);
        assert_eq!(output.medians.get("oq"), Some(0.0));
    }
}
