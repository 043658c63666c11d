//! Per-feature standardization for sequence data.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::dataset::{DatasetError, SequenceBatchIterator};

/// Mean/standard-deviation statistics per feature row.
///
/// Fit this on the training iterator only, then hand clones to both the
/// train and test iterators as their preprocessor — the test split must be
/// scaled with the training statistics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SequenceNormalizer {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl SequenceNormalizer {
    /// Stream every batch of `data` once and collect per-feature statistics
    /// over all timesteps. The iterator is reset before and after, and must
    /// not already carry a preprocessor (the statistics would be fitted on
    /// transformed values).
    pub fn fit(data: &mut SequenceBatchIterator) -> Result<Self, DatasetError> {
        data.reset();

        let mut sums: Vec<f64> = Vec::new();
        let mut sum_squares: Vec<f64> = Vec::new();
        let mut count = 0usize;

        while let Some(batch) = data.next_batch()? {
            for sequence in &batch.sequences {
                for step in sequence {
                    if sums.is_empty() {
                        sums = vec![0.0; step.nrows()];
                        sum_squares = vec![0.0; step.nrows()];
                    }
                    for (i, &value) in step.iter().enumerate().take(sums.len()) {
                        sums[i] += value;
                        sum_squares[i] += value * value;
                    }
                    count += 1;
                }
            }
        }
        data.reset();

        if count == 0 {
            return Err(DatasetError::Parse(
                "cannot fit a normalizer on an empty iterator".to_string(),
            ));
        }

        let n = count as f64;
        let mean: Vec<f64> = sums.iter().map(|&sum| sum / n).collect();
        let std: Vec<f64> = sum_squares
            .iter()
            .zip(&mean)
            .map(|(&sq, &mean)| ((sq / n) - mean * mean).max(0.0).sqrt().max(1e-8))
            .collect();

        Ok(SequenceNormalizer { mean, std })
    }

    /// Standardize one timestep column in place: `(x - mean) / std` per
    /// feature row.
    pub fn apply(&self, step: &mut Array2<f64>) {
        for ((value, &mean), &std) in step.iter_mut().zip(&self.mean).zip(&self.std) {
            *value = (*value - mean) / std;
        }
    }

    pub fn num_features(&self) -> usize {
        self.mean.len()
    }
}
