use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, Float64Array};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Float64Type, Schema};
use arrow::record_batch::RecordBatch;
use log::{debug, info, warn};

use crate::config::EmptyFeaturePolicy;
use crate::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// Median
// ---------------------------------------------------------------------------

/// Median of `values`: the middle element once sorted, or the mean of the two
/// middle elements for an even count. `None` for an empty slice.
///
/// Sorts `values` in place. Callers are expected to have removed NaNs.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Null and NaN both count as missing.
fn is_missing(value: Option<f64>) -> bool {
    value.map_or(true, f64::is_nan)
}

// ---------------------------------------------------------------------------
// MedianImputer
// ---------------------------------------------------------------------------

/// Column-wise median imputation over a fixed list of numeric features.
///
/// `fit` computes one median per feature from the observed values, and
/// [`FittedMedians::transform`] fills the gaps. Each column is handled
/// independently of the others.
#[derive(Debug, Clone)]
pub struct MedianImputer {
    features: Vec<String>,
    policy: EmptyFeaturePolicy,
}

/// Medians learned by [`MedianImputer::fit`], in feature order.
///
/// A `None` median only occurs under `EmptyFeaturePolicy::KeepMissing`.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedMedians {
    medians: Vec<(String, Option<f64>)>,
}

impl MedianImputer {
    pub fn new(features: Vec<String>, policy: EmptyFeaturePolicy) -> Self {
        MedianImputer { features, policy }
    }

    pub fn fit(&self, table: &RecordBatch) -> Result<FittedMedians> {
        let mut medians = Vec::with_capacity(self.features.len());
        let mut absent = Vec::new();

        for name in &self.features {
            let Some(column) = table.column_by_name(name) else {
                absent.push(name.clone());
                continue;
            };
            let values = as_float64(name, column)?;
            let mut observed: Vec<f64> = values
                .iter()
                .filter(|v| !is_missing(*v))
                .flatten()
                .collect();

            let value = match (median(&mut observed), self.policy) {
                (Some(m), _) => Some(m),
                (None, EmptyFeaturePolicy::Fail) => {
                    return Err(PipelineError::UndefinedMedian {
                        column: name.clone(),
                    });
                }
                (None, EmptyFeaturePolicy::KeepMissing) => {
                    warn!("'{name}' has no observed values; leaving it missing");
                    None
                }
                (None, EmptyFeaturePolicy::Zero) => {
                    warn!("'{name}' has no observed values; filling with 0");
                    Some(0.0)
                }
            };
            debug!("median of '{name}' over {} value(s): {value:?}", observed.len());
            medians.push((name.clone(), value));
        }

        if !absent.is_empty() {
            return Err(PipelineError::MissingColumns { columns: absent });
        }
        Ok(FittedMedians { medians })
    }

    pub fn fit_transform(&self, table: &RecordBatch) -> Result<(RecordBatch, FittedMedians)> {
        let fitted = self.fit(table)?;
        let imputed = fitted.transform(table)?;
        Ok((imputed, fitted))
    }
}

impl FittedMedians {
    pub fn get(&self, column: &str) -> Option<f64> {
        self.medians
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, m)| *m)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.medians.iter().map(|(name, m)| (name.as_str(), *m))
    }

    /// Replace every fitted feature column with a `Float64` copy whose missing
    /// entries hold the column median. All other columns are shared as-is, so
    /// row count, row order and non-feature data are unchanged.
    pub fn transform(&self, table: &RecordBatch) -> Result<RecordBatch> {
        let schema = table.schema();
        let mut fields: Vec<Field> = schema.fields().iter().map(|f| (**f).clone()).collect();
        let mut columns: Vec<ArrayRef> = table.columns().to_vec();

        for (name, fill) in &self.medians {
            let index = schema
                .index_of(name)
                .map_err(|_| PipelineError::MissingColumns {
                    columns: vec![name.clone()],
                })?;
            let values = as_float64(name, &columns[index])?;
            let filled: Float64Array = values
                .iter()
                .map(|v| if is_missing(v) { *fill } else { v })
                .collect();

            fields[index] = Field::new(name.as_str(), DataType::Float64, true);
            columns[index] = Arc::new(filled);
        }

        let schema = Schema::new_with_metadata(fields, schema.metadata().clone());
        let imputed = RecordBatch::try_new(Arc::new(schema), columns)?;
        info!("Imputed {} feature column(s)", self.medians.len());
        Ok(imputed)
    }
}

/// Numeric column widened to `Float64`; anything else is rejected.
fn as_float64(name: &str, column: &ArrayRef) -> Result<Float64Array> {
    let dt = column.data_type();
    if !dt.is_numeric() && dt != &DataType::Null {
        return Err(PipelineError::NonNumericFeature {
            column: name.to_string(),
            data_type: dt.clone(),
        });
    }
    let widened = cast(column, &DataType::Float64)?;
    Ok(widened.as_primitive::<Float64Type>().clone())
}
