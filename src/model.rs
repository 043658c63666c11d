//! LSTM sequence classifier: recurrent encoder plus a linear softmax head.

use ndarray::Array2;

use crate::layers::linear::{LinearGradients, LinearLayer};
use crate::layers::lstm_cell::{LSTMCell, LSTMCellCache, LSTMCellGradients};
use crate::loss::softmax;
use crate::optimizers::Optimizer;

/// Everything the backward pass needs from one forward pass over a sequence.
#[derive(Clone)]
pub struct ClassifierCache {
    pub step_caches: Vec<LSTMCellCache>,
    pub final_hidden: Array2<f64>,
}

/// Gradients for all classifier parameters.
#[derive(Clone)]
pub struct ClassifierGradients {
    pub cell: LSTMCellGradients,
    pub output: LinearGradients,
}

impl ClassifierGradients {
    /// Add another gradient set into this one, term by term.
    pub fn accumulate(&mut self, other: &ClassifierGradients) {
        self.cell.accumulate(&other.cell);
        self.output.accumulate(&other.output);
    }
}

/// Sequence classifier: an LSTM cell unrolled over the input sequence from
/// zero state, with the final hidden state projected to class logits.
///
/// The loss lives only at the final timestep, so the backward pass runs
/// full backpropagation through time: hidden and cell gradients are carried
/// from the last step back to the first while parameter gradients
/// accumulate.
#[derive(Clone)]
pub struct SequenceClassifier {
    pub cell: LSTMCell,
    pub output: LinearLayer,
    pub input_size: usize,
    pub hidden_size: usize,
    pub num_classes: usize,
}

impl SequenceClassifier {
    pub fn new(input_size: usize, hidden_size: usize, num_classes: usize) -> Self {
        SequenceClassifier {
            cell: LSTMCell::new(input_size, hidden_size),
            output: LinearLayer::new(hidden_size, num_classes),
            input_size,
            hidden_size,
            num_classes,
        }
    }

    /// Rebuild a classifier from its layers (used when loading a saved
    /// model). Sizes are derived from the layer shapes.
    pub fn from_parts(cell: LSTMCell, output: LinearLayer) -> Self {
        assert_eq!(
            cell.hidden_size, output.input_size,
            "output head must accept the LSTM hidden state"
        );
        SequenceClassifier {
            input_size: cell.input_size,
            hidden_size: cell.hidden_size,
            num_classes: output.output_size,
            cell,
            output,
        }
    }

    /// Class logits for a sequence of `(input_size, 1)` timesteps.
    pub fn forward(&self, inputs: &[Array2<f64>]) -> Array2<f64> {
        self.forward_with_cache(inputs).0
    }

    /// Forward pass retaining per-step caches for a later backward pass.
    pub fn forward_with_cache(&self, inputs: &[Array2<f64>]) -> (Array2<f64>, ClassifierCache) {
        assert!(!inputs.is_empty(), "cannot classify an empty sequence");

        let mut hx = Array2::zeros((self.hidden_size, 1));
        let mut cx = Array2::zeros((self.hidden_size, 1));
        let mut step_caches = Vec::with_capacity(inputs.len());

        for input in inputs {
            let (hy, cy, cache) = self.cell.forward_with_cache(input, &hx, &cx);
            step_caches.push(cache);
            hx = hy;
            cx = cy;
        }

        let logits = self.output.forward(&hx);
        (
            logits,
            ClassifierCache {
                step_caches,
                final_hidden: hx,
            },
        )
    }

    /// Softmax class probabilities for a sequence.
    pub fn class_probabilities(&self, inputs: &[Array2<f64>]) -> Array2<f64> {
        softmax(&self.forward(inputs))
    }

    /// Most probable class for a sequence.
    pub fn predict(&self, inputs: &[Array2<f64>]) -> usize {
        let logits = self.forward(inputs);
        argmax_column(&logits)
    }

    /// Full backward pass through time from the logits gradient.
    pub fn backward(
        &self,
        dlogits: &Array2<f64>,
        cache: &ClassifierCache,
    ) -> ClassifierGradients {
        let (output_grads, dh_final) = self.output.backward(dlogits, &cache.final_hidden);

        let mut dh = dh_final;
        let mut dc = Array2::zeros((self.hidden_size, 1));
        let mut cell_grads = self.cell.zero_gradients();

        for step_cache in cache.step_caches.iter().rev() {
            let (step_grads, _dx, dhx, dcx) = self.cell.backward(&dh, &dc, step_cache);
            cell_grads.accumulate(&step_grads);
            dh = dhx;
            dc = dcx;
        }

        ClassifierGradients {
            cell: cell_grads,
            output: output_grads,
        }
    }

    /// Initialize zero gradients for accumulation
    pub fn zero_gradients(&self) -> ClassifierGradients {
        ClassifierGradients {
            cell: self.cell.zero_gradients(),
            output: self.output.zero_gradients(),
        }
    }

    /// Apply gradients using the provided optimizer
    pub fn update_parameters<O: Optimizer>(
        &mut self,
        gradients: &ClassifierGradients,
        optimizer: &mut O,
    ) {
        self.cell
            .update_parameters(&gradients.cell, optimizer, "lstm");
        self.output
            .update_parameters(&gradients.output, optimizer, "output");
    }
}

/// Row index of the largest value in a single-column array.
fn argmax_column(column: &Array2<f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, &value) in column.iter().enumerate() {
        if value > best_value {
            best = i;
            best_value = value;
        }
    }
    best
}
