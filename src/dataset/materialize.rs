//! On-disk layout and the sequential write loop.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;

use super::split::{SplitAssignment, SplitLabel};
use super::DatasetError;

/// The four output directories derived from a root. Pure path arithmetic;
/// nothing is touched on disk until [`DatasetLayout::ensure_directories`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetLayout {
    pub root: PathBuf,
    pub train_features: PathBuf,
    pub train_labels: PathBuf,
    pub test_features: PathBuf,
    pub test_labels: PathBuf,
}

impl DatasetLayout {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let train = root.join("train");
        let test = root.join("test");
        DatasetLayout {
            train_features: train.join("features"),
            train_labels: train.join("labels"),
            test_features: test.join("features"),
            test_labels: test.join("labels"),
            root,
        }
    }

    /// Create all four directories. Idempotent; runs once before the
    /// write loop.
    pub fn ensure_directories(&self) -> io::Result<()> {
        fs::create_dir_all(&self.train_features)?;
        fs::create_dir_all(&self.train_labels)?;
        fs::create_dir_all(&self.test_features)?;
        fs::create_dir_all(&self.test_labels)?;
        Ok(())
    }

    pub fn features_dir(&self, partition: SplitLabel) -> &Path {
        match partition {
            SplitLabel::Train => &self.train_features,
            SplitLabel::Test => &self.test_features,
        }
    }

    pub fn labels_dir(&self, partition: SplitLabel) -> &Path {
        match partition {
            SplitLabel::Train => &self.train_labels,
            SplitLabel::Test => &self.test_labels,
        }
    }

    pub fn feature_file(&self, partition: SplitLabel, index: usize) -> PathBuf {
        self.features_dir(partition).join(format!("{}.csv", index))
    }

    pub fn label_file(&self, partition: SplitLabel, index: usize) -> PathBuf {
        self.labels_dir(partition).join(format!("{}.csv", index))
    }
}

/// Write every assignment as a `<partition>/features/<index>.csv` and
/// `<partition>/labels/<index>.csv` pair. Writes are whole-content
/// overwrites; the first failure aborts the loop and is returned, leaving
/// whatever was already written in place.
pub fn write_dataset(
    layout: &DatasetLayout,
    assignments: &[SplitAssignment],
) -> Result<(), DatasetError> {
    layout.ensure_directories()?;

    let mut train_count = 0usize;
    let mut test_count = 0usize;
    for assignment in assignments {
        fs::write(
            layout.feature_file(assignment.partition, assignment.index),
            &assignment.record.content,
        )?;
        fs::write(
            layout.label_file(assignment.partition, assignment.index),
            assignment.record.label.to_string(),
        )?;
        match assignment.partition {
            SplitLabel::Train => train_count += 1,
            SplitLabel::Test => test_count += 1,
        }
    }

    info!(
        "materialized {} train and {} test sequence pairs under {}",
        train_count,
        test_count,
        layout.root.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::records::LabeledSequence;
    use tempfile::tempdir;

    #[test]
    fn test_layout_paths() {
        let layout = DatasetLayout::new("uci");
        assert_eq!(layout.train_features, PathBuf::from("uci/train/features"));
        assert_eq!(layout.train_labels, PathBuf::from("uci/train/labels"));
        assert_eq!(layout.test_features, PathBuf::from("uci/test/features"));
        assert_eq!(layout.test_labels, PathBuf::from("uci/test/labels"));
        assert_eq!(
            layout.feature_file(SplitLabel::Test, 3),
            PathBuf::from("uci/test/features/3.csv")
        );
        assert_eq!(
            layout.label_file(SplitLabel::Train, 0),
            PathBuf::from("uci/train/labels/0.csv")
        );
    }

    #[test]
    fn test_ensure_directories_is_idempotent() {
        let dir = tempdir().unwrap();
        let layout = DatasetLayout::new(dir.path().join("uci"));
        layout.ensure_directories().unwrap();
        layout.ensure_directories().unwrap();
        assert!(layout.train_features.is_dir());
        assert!(layout.test_labels.is_dir());
    }

    #[test]
    fn test_write_dataset_contents() {
        let dir = tempdir().unwrap();
        let layout = DatasetLayout::new(dir.path().join("uci"));
        let assignments = vec![
            SplitAssignment {
                partition: SplitLabel::Train,
                index: 0,
                record: LabeledSequence {
                    content: "5.2\n5.3\n5.0\n".to_string(),
                    label: 0,
                },
            },
            SplitAssignment {
                partition: SplitLabel::Test,
                index: 0,
                record: LabeledSequence {
                    content: "1.0\n2.0\n".to_string(),
                    label: 2,
                },
            },
        ];

        write_dataset(&layout, &assignments).unwrap();

        let features = fs::read_to_string(layout.feature_file(SplitLabel::Train, 0)).unwrap();
        assert_eq!(features, "5.2\n5.3\n5.0\n");
        let label = fs::read_to_string(layout.label_file(SplitLabel::Test, 0)).unwrap();
        assert_eq!(label, "2");
    }

    #[test]
    fn test_write_dataset_overwrites() {
        let dir = tempdir().unwrap();
        let layout = DatasetLayout::new(dir.path().join("uci"));
        let mut assignment = SplitAssignment {
            partition: SplitLabel::Train,
            index: 0,
            record: LabeledSequence {
                content: "1.0\n".to_string(),
                label: 0,
            },
        };

        write_dataset(&layout, std::slice::from_ref(&assignment)).unwrap();
        assignment.record.content = "9.0\n".to_string();
        write_dataset(&layout, std::slice::from_ref(&assignment)).unwrap();

        let features = fs::read_to_string(layout.feature_file(SplitLabel::Train, 0)).unwrap();
        assert_eq!(features, "9.0\n");
    }
}
