//! Writes a synthetic `NF*/PF*` subject tree for trying out `voice-merge`.
//!
//! Usage: `generate_sample [OUTPUT_ROOT]` (default `parquets/no_wind/sujetos`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use voice_merge::config::DEFAULT_FEATURES;

/// Rough (mean, standard deviation) per feature, in `DEFAULT_FEATURES` order.
const FEATURE_STATS: [(f64, f64); 16] = [
    (8.5, 1.2),     // cppall
    (0.12, 0.03),   // zcrall
    (0.45, 0.08),   // normpeakall
    (-12.0, 2.5),   // spectralTiltall
    (28.0, 4.0),    // LHratioall
    (4.0, 2.0),     // H1H2all
    (0.7, 0.1),     // periodicity
    (68.0, 5.0),    // level
    (190.0, 35.0),  // freq
    (-32.0, 4.0),   // dBcms2
    (9.0, 1.3),     // cppall_2048
    (120.0, 30.0),  // acflow
    (350.0, 80.0),  // mfdr
    (0.55, 0.07),   // oq
    (0.11, 0.03),   // naq
    (5.0, 2.5),     // h1h2
];

/// Share of feature cells left empty.
const MISSING_RATE: f64 = 0.05;

/// SplitMix64 generator; the same seed always yields the same tree.
struct SplitMix64(u64);

impl SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Normal sample via Box-Muller.
    fn normal(&mut self, mean: f64, sd: f64) -> f64 {
        let radius = (-2.0 * (1.0 - self.unit()).ln()).sqrt();
        let angle = std::f64::consts::TAU * self.unit();
        mean + sd * radius * angle.cos()
    }
}

/// One session of `rows` voiced frames for `subject`.
fn session(subject: &str, week: i64, rows: usize, rng: &mut SplitMix64) -> Result<RecordBatch> {
    let start = 1_700_000_000.0 + week as f64 * 604_800.0;
    let date = format!("2024-W{week:02}");

    let mut fields = vec![
        Field::new("ts", DataType::Float64, false),
        Field::new("subject_id", DataType::Utf8, false),
        Field::new("week", DataType::Int64, false),
        Field::new("date", DataType::Utf8, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(Float64Array::from_iter_values((0..rows).map(|i| start + i as f64 * 0.05))),
        Arc::new(StringArray::from(vec![subject; rows])),
        Arc::new(Int64Array::from(vec![week; rows])),
        Arc::new(StringArray::from(vec![date.as_str(); rows])),
    ];

    for (name, &(mean, sd)) in DEFAULT_FEATURES.iter().zip(FEATURE_STATS.iter()) {
        let values: Float64Array = (0..rows)
            .map(|_| {
                let value = rng.normal(mean, sd);
                (rng.unit() >= MISSING_RATE).then_some(value)
            })
            .collect();
        fields.push(Field::new(*name, DataType::Float64, true));
        columns.push(Arc::new(values));
    }

    fields.push(Field::new("voicedRMS", DataType::Float64, false));
    columns.push(Arc::new(Float64Array::from_iter_values(
        (0..rows).map(|_| rng.normal(0.05, 0.01).abs()),
    )));

    // Not part of the merged dataset; dropped by the projection.
    fields.push(Field::new("windRMS", DataType::Float64, false));
    columns.push(Arc::new(Float64Array::from_iter_values(
        (0..rows).map(|_| rng.normal(0.002, 0.001).abs()),
    )));

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).context("building session batch")
}

fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("parquets/no_wind/sujetos"));
    let mut rng = SplitMix64(42);

    let subjects = ["NF001", "NF002", "NF003", "PF001", "PF002", "PF003"];
    let mut files = 0;
    let mut rows_total = 0;

    for subject in subjects {
        let folder = root.join(subject);
        std::fs::create_dir_all(&folder)
            .with_context(|| format!("creating {}", folder.display()))?;

        for week in 1..=3 {
            let rows = 40 + (rng.next_u64() % 40) as usize;
            let batch = session(subject, week, rows, &mut rng)?;
            write_parquet(&folder.join(format!("week{week:02}.parquet")), &batch)?;
            files += 1;
            rows_total += rows;
        }
    }

    println!(
        "Wrote {files} recordings ({rows_total} rows) for {} subjects under {}",
        subjects.len(),
        root.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SplitMix64(7);
        let mut b = SplitMix64(7);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn unit_stays_in_range() {
        let mut rng = SplitMix64(1);
        assert!((0..10_000).map(|_| rng.unit()).all(|u| (0.0..1.0).contains(&u)));
    }

    #[test]
    fn session_has_dataset_columns_and_some_gaps() {
        let mut rng = SplitMix64(42);
        let batch = session("NF001", 2, 400, &mut rng).unwrap();
        assert_eq!(batch.num_rows(), 400);
        for name in voice_merge::config::DEFAULT_COLUMNS {
            assert!(batch.column_by_name(name).is_some(), "{name} missing");
        }
        let gaps: usize = DEFAULT_FEATURES
            .iter()
            .map(|f| batch.column_by_name(f).unwrap().null_count())
            .sum();
        assert!(gaps > 0);
    }
}
