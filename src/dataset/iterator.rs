//! Batched reader for numbered sequence-file pairs.
//!
//! This is the interface the training side consumes: a features directory
//! and a parallel labels directory of `<0..n-1>.csv` files, read in index
//! order as mini-batches, with reset-to-start support for repeated epochs.

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array2;

use super::materialize::DatasetLayout;
use super::split::SplitLabel;
use super::DatasetError;
use crate::normalize::SequenceNormalizer;

/// One mini-batch of sequences with their targets.
#[derive(Clone, Debug)]
pub struct SequenceBatch {
    /// Per example: one `(features, 1)` array per timestep.
    pub sequences: Vec<Vec<Array2<f64>>>,
    /// Per example: a one-hot `(classes, 1)` target column.
    pub targets: Vec<Array2<f64>>,
    /// Per example: the raw class index.
    pub labels: Vec<usize>,
}

impl SequenceBatch {
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

/// Iterator over numbered feature/label CSV pairs.
///
/// Files are discovered at construction by scanning for `0.csv`, `1.csv`, …
/// until the first gap; a features/labels count mismatch is rejected up
/// front. An optional preprocessor is applied to every timestep as batches
/// are assembled.
#[derive(Debug)]
pub struct SequenceBatchIterator {
    features_dir: PathBuf,
    labels_dir: PathBuf,
    batch_size: usize,
    num_classes: usize,
    total: usize,
    cursor: usize,
    preprocessor: Option<SequenceNormalizer>,
}

impl SequenceBatchIterator {
    pub fn new<P: AsRef<Path>>(
        features_dir: P,
        labels_dir: P,
        batch_size: usize,
        num_classes: usize,
    ) -> Result<Self, DatasetError> {
        assert!(batch_size > 0, "batch size must be positive");
        assert!(num_classes > 0, "class count must be positive");

        let features_dir = features_dir.as_ref().to_path_buf();
        let labels_dir = labels_dir.as_ref().to_path_buf();

        let total = count_numbered_files(&features_dir);
        let label_total = count_numbered_files(&labels_dir);
        if total != label_total {
            return Err(DatasetError::Parse(format!(
                "found {} feature files but {} label files under {} / {}",
                total,
                label_total,
                features_dir.display(),
                labels_dir.display()
            )));
        }

        Ok(SequenceBatchIterator {
            features_dir,
            labels_dir,
            batch_size,
            num_classes,
            total,
            cursor: 0,
            preprocessor: None,
        })
    }

    /// Iterator over one partition of a materialized layout.
    pub fn from_layout(
        layout: &DatasetLayout,
        partition: SplitLabel,
        batch_size: usize,
        num_classes: usize,
    ) -> Result<Self, DatasetError> {
        SequenceBatchIterator::new(
            layout.features_dir(partition),
            layout.labels_dir(partition),
            batch_size,
            num_classes,
        )
    }

    /// Apply `normalizer` to every timestep of every batch from now on.
    pub fn set_preprocessor(&mut self, normalizer: SequenceNormalizer) {
        self.preprocessor = Some(normalizer);
    }

    pub fn total_examples(&self) -> usize {
        self.total
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Rewind to the first example.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Read the next batch, or `None` once the partition is exhausted.
    /// The final batch may be smaller than the configured batch size.
    pub fn next_batch(&mut self) -> Result<Option<SequenceBatch>, DatasetError> {
        if self.cursor >= self.total {
            return Ok(None);
        }

        let end = (self.cursor + self.batch_size).min(self.total);
        let mut sequences = Vec::with_capacity(end - self.cursor);
        let mut targets = Vec::with_capacity(end - self.cursor);
        let mut labels = Vec::with_capacity(end - self.cursor);

        for index in self.cursor..end {
            sequences.push(self.read_sequence(index)?);
            let label = self.read_label(index)?;
            targets.push(self.one_hot(label, index)?);
            labels.push(label);
        }
        self.cursor = end;

        Ok(Some(SequenceBatch {
            sequences,
            targets,
            labels,
        }))
    }

    fn read_sequence(&self, index: usize) -> Result<Vec<Array2<f64>>, DatasetError> {
        let path = self.features_dir.join(format!("{}.csv", index));
        let text = fs::read_to_string(&path)?;

        let mut steps = Vec::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let values = line
                .split(',')
                .map(|token| token.trim().parse::<f64>())
                .collect::<Result<Vec<f64>, _>>()
                .map_err(|_| {
                    DatasetError::Parse(format!(
                        "non-numeric value in {}: {:?}",
                        path.display(),
                        line
                    ))
                })?;

            let mut step = Array2::from_shape_vec((values.len(), 1), values)
                .expect("column shape always matches token count");
            if let Some(normalizer) = &self.preprocessor {
                normalizer.apply(&mut step);
            }
            steps.push(step);
        }
        Ok(steps)
    }

    fn read_label(&self, index: usize) -> Result<usize, DatasetError> {
        let path = self.labels_dir.join(format!("{}.csv", index));
        let text = fs::read_to_string(&path)?;
        text.trim().parse::<usize>().map_err(|_| {
            DatasetError::Parse(format!(
                "label file {} does not hold an integer: {:?}",
                path.display(),
                text
            ))
        })
    }

    fn one_hot(&self, label: usize, index: usize) -> Result<Array2<f64>, DatasetError> {
        if label >= self.num_classes {
            return Err(DatasetError::Parse(format!(
                "label {} of example {} exceeds the configured class count {}",
                label, index, self.num_classes
            )));
        }
        let mut target = Array2::zeros((self.num_classes, 1));
        target[[label, 0]] = 1.0;
        Ok(target)
    }
}

/// Count contiguous `<i>.csv` files starting at 0.
fn count_numbered_files(dir: &Path) -> usize {
    let mut count = 0usize;
    while dir.join(format!("{}.csv", count)).is_file() {
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_pair(features: &Path, labels: &Path, index: usize, body: &str, label: usize) {
        fs::write(features.join(format!("{}.csv", index)), body).unwrap();
        fs::write(labels.join(format!("{}.csv", index)), label.to_string()).unwrap();
    }

    fn setup(n: usize) -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempdir().unwrap();
        let features = dir.path().join("features");
        let labels = dir.path().join("labels");
        fs::create_dir_all(&features).unwrap();
        fs::create_dir_all(&labels).unwrap();
        for i in 0..n {
            write_pair(&features, &labels, i, &format!("{}.0\n{}.5\n", i, i), i % 3);
        }
        (dir, features, labels)
    }

    #[test]
    fn test_counts_numbered_files() {
        let (_dir, features, labels) = setup(5);
        let iter = SequenceBatchIterator::new(&features, &labels, 2, 3).unwrap();
        assert_eq!(iter.total_examples(), 5);
        assert_eq!(iter.num_classes(), 3);
    }

    #[test]
    fn test_batch_shapes_and_order() {
        let (_dir, features, labels) = setup(5);
        let mut iter = SequenceBatchIterator::new(&features, &labels, 2, 3).unwrap();

        let batch = iter.next_batch().unwrap().unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.sequences[0].len(), 2);
        assert_eq!(batch.sequences[0][0].shape(), &[1, 1]);
        assert_eq!(batch.sequences[0][0][[0, 0]], 0.0);
        assert_eq!(batch.sequences[1][0][[0, 0]], 1.0);
        assert_eq!(batch.labels, vec![0, 1]);

        // One-hot targets line up with labels.
        assert_eq!(batch.targets[1][[1, 0]], 1.0);
        assert_eq!(batch.targets[1][[0, 0]], 0.0);
    }

    #[test]
    fn test_final_batch_is_short() {
        let (_dir, features, labels) = setup(5);
        let mut iter = SequenceBatchIterator::new(&features, &labels, 2, 3).unwrap();
        let mut sizes = Vec::new();
        while let Some(batch) = iter.next_batch().unwrap() {
            sizes.push(batch.len());
        }
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn test_reset_replays_from_start() {
        let (_dir, features, labels) = setup(4);
        let mut iter = SequenceBatchIterator::new(&features, &labels, 4, 3).unwrap();
        let first = iter.next_batch().unwrap().unwrap();
        assert!(iter.next_batch().unwrap().is_none());

        iter.reset();
        let replay = iter.next_batch().unwrap().unwrap();
        assert_eq!(first.labels, replay.labels);
        assert_eq!(first.sequences[2][1], replay.sequences[2][1]);
    }

    #[test]
    fn test_count_mismatch_rejected() {
        let (_dir, features, labels) = setup(3);
        fs::remove_file(labels.join("2.csv")).unwrap();
        let err = SequenceBatchIterator::new(&features, &labels, 2, 3).unwrap_err();
        assert!(matches!(err, DatasetError::Parse(_)));
    }

    #[test]
    fn test_non_numeric_feature_is_a_parse_error() {
        let (_dir, features, labels) = setup(2);
        fs::write(features.join("1.csv"), "1.0\nnot-a-number\n").unwrap();
        let mut iter = SequenceBatchIterator::new(&features, &labels, 4, 3).unwrap();
        let err = iter.next_batch().unwrap_err();
        assert!(matches!(err, DatasetError::Parse(_)));
    }

    #[test]
    fn test_out_of_range_label_rejected() {
        let (_dir, features, labels) = setup(2);
        fs::write(labels.join("1.csv"), "7").unwrap();
        let mut iter = SequenceBatchIterator::new(&features, &labels, 4, 3).unwrap();
        let err = iter.next_batch().unwrap_err();
        assert!(matches!(err, DatasetError::Parse(_)));
    }
}
