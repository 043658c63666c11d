//! # Synthetic Control LSTM
//!
//! Sequence classification on the UCI synthetic control chart dataset:
//! a deterministic dataset preparation pipeline plus an LSTM classifier
//! with training, normalization, and evaluation.
//!
//! ## Core Components
//!
//! - **Dataset pipeline**: download, per-line transposition, block labeling,
//!   seeded shuffle/split, and numbered CSV materialization under
//!   `train/test × features/labels` directories
//! - **Sequence iterators**: batched reading of numbered feature/label file
//!   pairs with reset-to-start support for epoch iteration
//! - **Normalization**: per-feature standardization fitted on the training
//!   split and applied as a batch preprocessor
//! - **Classifier**: single-layer LSTM with a linear softmax head, trained
//!   with full backpropagation through time and gradient clipping
//! - **Evaluation & Persistence**: confusion-matrix metrics and JSON/binary
//!   model snapshots
//!
//! ## Quick Start
//!
//! ```no_run
//! use synthetic_control_lstm::dataset::{self, DatasetConfig, SequenceBatchIterator, SplitLabel};
//! use synthetic_control_lstm::normalize::SequenceNormalizer;
//! use synthetic_control_lstm::model::SequenceClassifier;
//! use synthetic_control_lstm::trainer::create_adam_trainer;
//!
//! # fn main() -> Result<(), synthetic_control_lstm::DatasetError> {
//! let config = DatasetConfig::default();
//! let layout = dataset::prepare(&config)?;
//!
//! let mut train = SequenceBatchIterator::from_layout(&layout, SplitLabel::Train, config.batch_size, 6)?;
//! let mut test = SequenceBatchIterator::from_layout(&layout, SplitLabel::Test, config.batch_size, 6)?;
//!
//! let normalizer = SequenceNormalizer::fit(&mut train)?;
//! train.set_preprocessor(normalizer.clone());
//! test.set_preprocessor(normalizer);
//!
//! let model = SequenceClassifier::new(1, 10, 6);
//! let mut trainer = create_adam_trainer(model, 0.005);
//! trainer.train(&mut train, Some(&mut test))?;
//!
//! println!("{}", trainer.evaluate_model(&mut test)?);
//! # Ok(())
//! # }
//! ```

/// Main library module.
pub mod utils;
pub mod dataset;
pub mod normalize;
pub mod layers;
pub mod model;
pub mod loss;
pub mod optimizers;
pub mod eval;
pub mod trainer;
pub mod persistence;

// Re-export commonly used items
pub use dataset::{DatasetConfig, DatasetError, DatasetLayout, SequenceBatch, SequenceBatchIterator, SplitLabel};
pub use normalize::SequenceNormalizer;
pub use model::SequenceClassifier;
pub use trainer::{ClassifierTrainer, ModelTrainer, TrainingConfig};
pub use eval::Evaluation;
pub use loss::CrossEntropyLoss;
pub use optimizers::{Adam, Optimizer, SGD};
pub use persistence::{ModelMetadata, ModelPersistence, PersistenceError, PersistentModel};
