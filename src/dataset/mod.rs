//! Dataset preparation pipeline for the UCI synthetic control chart data.
//!
//! The pipeline runs single-threaded in one pass: download the raw file,
//! transpose each line into a column of values, assign a label from the
//! line's position, shuffle with a fixed seed, split into train/test, and
//! write one numbered feature/label CSV pair per sequence. The resulting
//! directory tree is consumed through [`SequenceBatchIterator`].

pub mod fetch;
pub mod records;
pub mod split;
pub mod materialize;
pub mod iterator;

use std::fmt;
use std::path::PathBuf;

use log::info;

pub use iterator::{SequenceBatch, SequenceBatchIterator};
pub use materialize::DatasetLayout;
pub use records::{LabeledSequence, RawRecord};
pub use split::{SplitAssignment, SplitLabel};

/// Canonical download location of the synthetic control chart dataset:
/// 600 lines, each a univariate series of 60 space-separated values.
pub const SYNTHETIC_CONTROL_URL: &str =
    "https://archive.ics.uci.edu/ml/machine-learning-databases/synthetic_control-mld/synthetic_control.data";

/// Configuration for the dataset preparation pipeline.
///
/// The seed is an explicit parameter rather than a hidden constant: the
/// standardizer is fitted on the training split alone, so every run must
/// reproduce the exact same shuffle to see the same training subset.
#[derive(Clone, Debug)]
pub struct DatasetConfig {
    /// Where to download the raw data from.
    pub source_url: String,
    /// Output root. Its existence is the idempotence signal: when the
    /// directory is already present the whole pipeline is skipped.
    pub root_dir: PathBuf,
    /// Fraction of sequences assigned to the training partition.
    pub train_ratio: f64,
    /// Number of consecutive source lines sharing one label.
    pub block_size: usize,
    /// Default mini-batch size handed to iterators built over the output.
    pub batch_size: usize,
    /// Shuffle seed.
    pub seed: u64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig {
            source_url: SYNTHETIC_CONTROL_URL.to_string(),
            root_dir: PathBuf::from("uci"),
            train_ratio: 0.75,
            block_size: 100,
            batch_size: 10,
            seed: 12345,
        }
    }
}

impl DatasetConfig {
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    pub fn with_root_dir(mut self, root: impl Into<PathBuf>) -> Self {
        self.root_dir = root.into();
        self
    }

    pub fn with_train_ratio(mut self, ratio: f64) -> Self {
        self.train_ratio = ratio;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of sequences assigned to the training partition for a
    /// dataset of `total` sequences. The canonical 600 × 0.75 gives 450.
    pub fn n_train(&self, total: usize) -> usize {
        ((total as f64) * self.train_ratio).round() as usize
    }
}

/// Errors produced by the preparation pipeline and the sequence-file reader.
#[derive(Debug)]
pub enum DatasetError {
    /// Network or HTTP failure while downloading the raw data.
    Fetch(reqwest::Error),
    /// Directory creation, file write, or file read failure.
    Io(std::io::Error),
    /// A materialized file does not hold what the reader expects.
    Parse(String),
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::Fetch(err) => write!(f, "fetch error: {}", err),
            DatasetError::Io(err) => write!(f, "IO error: {}", err),
            DatasetError::Parse(msg) => write!(f, "parse error: {}", msg),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Fetch(err) => Some(err),
            DatasetError::Io(err) => Some(err),
            DatasetError::Parse(_) => None,
        }
    }
}

impl From<reqwest::Error> for DatasetError {
    fn from(error: reqwest::Error) -> Self {
        DatasetError::Fetch(error)
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(error: std::io::Error) -> Self {
        DatasetError::Io(error)
    }
}

/// Run the full pipeline: download, reshape, shuffle/split, materialize.
///
/// When `config.root_dir` already exists the pipeline is skipped entirely
/// and the layout over the existing tree is returned. There is no content
/// validation of an existing root; delete the directory to force a rebuild.
pub fn prepare(config: &DatasetConfig) -> Result<DatasetLayout, DatasetError> {
    let layout = DatasetLayout::new(&config.root_dir);
    if config.root_dir.exists() {
        info!(
            "dataset root {} already present, skipping download and materialization",
            config.root_dir.display()
        );
        return Ok(layout);
    }

    info!("downloading {}", config.source_url);
    let lines = fetch::fetch_lines(&config.source_url)?;
    prepare_from_lines(&lines, config)
}

/// Network-free pipeline entry: reshape, shuffle/split, and materialize
/// already-fetched lines. Unconditionally overwrites the output files.
pub fn prepare_from_lines(
    lines: &[String],
    config: &DatasetConfig,
) -> Result<DatasetLayout, DatasetError> {
    let labeled: Vec<LabeledSequence> = lines
        .iter()
        .enumerate()
        .map(|(ordinal, line)| RawRecord::new(ordinal, line).into_labeled(config.block_size))
        .collect();

    let assignments = split::shuffle_split(labeled, config.n_train(lines.len()), config.seed);

    let layout = DatasetLayout::new(&config.root_dir);
    materialize::write_dataset(&layout, &assignments)?;
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DatasetConfig::default();
        assert_eq!(config.source_url, SYNTHETIC_CONTROL_URL);
        assert_eq!(config.root_dir, PathBuf::from("uci"));
        assert_eq!(config.block_size, 100);
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.seed, 12345);
        assert!((config.train_ratio - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_n_train_canonical() {
        let config = DatasetConfig::default();
        assert_eq!(config.n_train(600), 450);
        assert_eq!(config.n_train(0), 0);
    }

    #[test]
    fn test_builder_methods() {
        let config = DatasetConfig::default()
            .with_root_dir("out")
            .with_train_ratio(0.8)
            .with_block_size(10)
            .with_batch_size(4)
            .with_seed(7)
            .with_source_url("http://localhost/data.txt");

        assert_eq!(config.root_dir, PathBuf::from("out"));
        assert_eq!(config.n_train(60), 48);
        assert_eq!(config.block_size, 10);
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.seed, 7);
        assert_eq!(config.source_url, "http://localhost/data.txt");
    }
}
