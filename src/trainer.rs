//! Training loop for the sequence classifier over materialized datasets.

use std::time::Instant;

use ndarray::Array2;

use crate::dataset::{DatasetError, SequenceBatch, SequenceBatchIterator};
use crate::eval::Evaluation;
use crate::loss::{CrossEntropyLoss, LossFunction};
use crate::model::{ClassifierGradients, SequenceClassifier};
use crate::optimizers::{Adam, Optimizer, SGD};

/// Configuration for training hyperparameters
pub struct TrainingConfig {
    pub epochs: usize,
    pub print_every: usize,
    pub clip_gradient: Option<f64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            epochs: 40,
            print_every: 5,
            clip_gradient: Some(5.0),
        }
    }
}

/// Training metrics tracked per epoch
#[derive(Debug, Clone)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub train_loss: f64,
    pub eval_accuracy: Option<f64>,
    pub time_elapsed: f64,
}

/// The capability surface the prepared dataset is handed to: fit on an
/// iterator of sequence batches, reset internal state, and score an
/// iterator into metrics.
pub trait ModelTrainer {
    type Metrics;

    fn fit(&mut self, data: &mut SequenceBatchIterator) -> Result<(), DatasetError>;
    fn reset(&mut self);
    fn evaluate(&mut self, data: &mut SequenceBatchIterator) -> Result<Self::Metrics, DatasetError>;
}

/// Trainer for [`SequenceClassifier`] with a configurable optimizer
pub struct ClassifierTrainer<O: Optimizer> {
    pub model: SequenceClassifier,
    pub loss_function: CrossEntropyLoss,
    pub optimizer: O,
    pub config: TrainingConfig,
    pub metrics_history: Vec<EpochMetrics>,
}

impl<O: Optimizer> ClassifierTrainer<O> {
    pub fn new(model: SequenceClassifier, optimizer: O) -> Self {
        ClassifierTrainer {
            model,
            loss_function: CrossEntropyLoss,
            optimizer,
            config: TrainingConfig::default(),
            metrics_history: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: TrainingConfig) -> Self {
        self.config = config;
        self
    }

    /// Train on one mini-batch: accumulate gradients over its sequences,
    /// clip, and apply a single parameter update. Returns the mean loss.
    pub fn train_batch(&mut self, batch: &SequenceBatch) -> f64 {
        if batch.is_empty() {
            return 0.0;
        }

        let mut total_loss = 0.0;
        let mut gradients = self.model.zero_gradients();

        for (sequence, target) in batch.sequences.iter().zip(batch.targets.iter()) {
            let (logits, cache) = self.model.forward_with_cache(sequence);
            total_loss += self.loss_function.compute_loss(&logits, target);

            let dlogits = self.loss_function.compute_gradient(&logits, target);
            gradients.accumulate(&self.model.backward(&dlogits, &cache));
        }

        // Apply gradient clipping to prevent exploding gradients
        if let Some(clip_value) = self.config.clip_gradient {
            self.clip_gradients(&mut gradients, clip_value);
        }

        self.model.update_parameters(&gradients, &mut self.optimizer);

        total_loss / batch.len() as f64
    }

    /// Train for the configured number of epochs, optionally scoring a
    /// held-out iterator after each epoch.
    pub fn train(
        &mut self,
        train_data: &mut SequenceBatchIterator,
        mut eval_data: Option<&mut SequenceBatchIterator>,
    ) -> Result<(), DatasetError> {
        println!("Starting training for {} epochs...", self.config.epochs);

        for epoch in 0..self.config.epochs {
            let start_time = Instant::now();
            let mut epoch_loss = 0.0;
            let mut batches = 0usize;

            train_data.reset();
            while let Some(batch) = train_data.next_batch()? {
                epoch_loss += self.train_batch(&batch);
                batches += 1;
            }
            if batches > 0 {
                epoch_loss /= batches as f64;
            }

            let eval_accuracy = match eval_data.as_deref_mut() {
                Some(data) => Some(self.evaluate_model(data)?.accuracy()),
                None => None,
            };

            let time_elapsed = start_time.elapsed().as_secs_f64();

            let metrics = EpochMetrics {
                epoch,
                train_loss: epoch_loss,
                eval_accuracy,
                time_elapsed,
            };
            self.metrics_history.push(metrics);

            if epoch % self.config.print_every == 0 {
                if let Some(accuracy) = eval_accuracy {
                    println!(
                        "Epoch {}: Train Loss: {:.6}, Eval Accuracy: {:.4}, Time: {:.2}s",
                        epoch, epoch_loss, accuracy, time_elapsed
                    );
                } else {
                    println!(
                        "Epoch {}: Train Loss: {:.6}, Time: {:.2}s",
                        epoch, epoch_loss, time_elapsed
                    );
                }
            }
        }

        println!("Training completed!");
        Ok(())
    }

    /// Score every example of `data` into a confusion-matrix evaluation.
    pub fn evaluate_model(
        &self,
        data: &mut SequenceBatchIterator,
    ) -> Result<Evaluation, DatasetError> {
        data.reset();
        let mut evaluation = Evaluation::new(data.num_classes());

        while let Some(batch) = data.next_batch()? {
            for (sequence, &label) in batch.sequences.iter().zip(batch.labels.iter()) {
                evaluation.record(label, self.model.predict(sequence));
            }
        }
        data.reset();

        Ok(evaluation)
    }

    pub fn get_latest_metrics(&self) -> Option<&EpochMetrics> {
        self.metrics_history.last()
    }

    pub fn get_metrics_history(&self) -> &[EpochMetrics] {
        &self.metrics_history
    }

    /// Clip each gradient matrix by its own norm
    fn clip_gradients(&self, gradients: &mut ClassifierGradients, max_norm: f64) {
        for matrix in [
            &mut gradients.cell.w_ih,
            &mut gradients.cell.w_hh,
            &mut gradients.cell.b_ih,
            &mut gradients.cell.b_hh,
            &mut gradients.output.weight,
            &mut gradients.output.bias,
        ] {
            clip_gradient_matrix(matrix, max_norm);
        }
    }
}

impl<O: Optimizer> ModelTrainer for ClassifierTrainer<O> {
    type Metrics = Evaluation;

    fn fit(&mut self, data: &mut SequenceBatchIterator) -> Result<(), DatasetError> {
        self.train(data, None)
    }

    fn reset(&mut self) {
        self.optimizer.reset();
        self.metrics_history.clear();
    }

    fn evaluate(
        &mut self,
        data: &mut SequenceBatchIterator,
    ) -> Result<Self::Metrics, DatasetError> {
        self.evaluate_model(data)
    }
}

fn clip_gradient_matrix(matrix: &mut Array2<f64>, max_norm: f64) {
    let norm = (&*matrix * &*matrix).sum().sqrt();
    if norm > max_norm {
        let scale = max_norm / norm;
        *matrix = matrix.map(|x| x * scale);
    }
}

/// Create a trainer with the SGD optimizer
pub fn create_sgd_trainer(model: SequenceClassifier, learning_rate: f64) -> ClassifierTrainer<SGD> {
    ClassifierTrainer::new(model, SGD::new(learning_rate))
}

/// Create a trainer with the Adam optimizer
pub fn create_adam_trainer(
    model: SequenceClassifier,
    learning_rate: f64,
) -> ClassifierTrainer<Adam> {
    ClassifierTrainer::new(model, Adam::new(learning_rate))
}
