use ndarray::Array2;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

use crate::optimizers::Optimizer;

/// Holds gradients for linear layer parameters during backpropagation
#[derive(Clone, Debug)]
pub struct LinearGradients {
    pub weight: Array2<f64>,
    pub bias: Array2<f64>,
}

impl LinearGradients {
    /// Add another gradient set into this one, term by term.
    pub fn accumulate(&mut self, other: &LinearGradients) {
        self.weight = &self.weight + &other.weight;
        self.bias = &self.bias + &other.bias;
    }
}

/// A fully connected projection layer.
///
/// Performs `output = weight @ input + bias` on `(input_size, 1)` columns.
/// The layer is stateless across calls: the backward pass receives the
/// forward input explicitly, so one layer can serve many cached forward
/// passes.
#[derive(Clone, Debug)]
pub struct LinearLayer {
    pub weight: Array2<f64>, // (output_size, input_size)
    pub bias: Array2<f64>,   // (output_size, 1)
    pub input_size: usize,
    pub output_size: usize,
}

impl LinearLayer {
    /// Create a new linear layer with Xavier/Glorot initialization
    pub fn new(input_size: usize, output_size: usize) -> Self {
        let scale = (2.0 / (input_size + output_size) as f64).sqrt();
        let weight = Array2::random((output_size, input_size), Uniform::new(-scale, scale));
        let bias = Array2::zeros((output_size, 1));

        Self {
            weight,
            bias,
            input_size,
            output_size,
        }
    }

    /// Rebuild a layer from saved parameters.
    pub fn from_parameters(weight: Array2<f64>, bias: Array2<f64>) -> Self {
        let (output_size, input_size) = weight.dim();
        assert_eq!(
            bias.shape(),
            &[output_size, 1],
            "bias shape must be (output_size, 1)"
        );
        Self {
            weight,
            bias,
            input_size,
            output_size,
        }
    }

    /// Forward pass: `(input_size, 1)` column in, `(output_size, 1)` out.
    pub fn forward(&self, input: &Array2<f64>) -> Array2<f64> {
        assert_eq!(
            input.nrows(),
            self.input_size,
            "input size {} doesn't match layer input size {}",
            input.nrows(),
            self.input_size
        );
        &self.weight.dot(input) + &self.bias
    }

    /// Backward pass given the output gradient and the input the forward
    /// pass saw. Returns (parameter_gradients, input_gradient).
    pub fn backward(
        &self,
        grad_output: &Array2<f64>,
        input: &Array2<f64>,
    ) -> (LinearGradients, Array2<f64>) {
        let gradients = LinearGradients {
            weight: grad_output.dot(&input.t()),
            bias: grad_output.clone(),
        };
        let grad_input = self.weight.t().dot(grad_output);
        (gradients, grad_input)
    }

    /// Initialize zero gradients for accumulation
    pub fn zero_gradients(&self) -> LinearGradients {
        LinearGradients {
            weight: Array2::zeros(self.weight.raw_dim()),
            bias: Array2::zeros(self.bias.raw_dim()),
        }
    }

    /// Apply gradients using the provided optimizer
    pub fn update_parameters<O: Optimizer>(
        &mut self,
        gradients: &LinearGradients,
        optimizer: &mut O,
        prefix: &str,
    ) {
        optimizer.update(
            &format!("{}_weight", prefix),
            &mut self.weight,
            &gradients.weight,
        );
        optimizer.update(&format!("{}_bias", prefix), &mut self.bias, &gradients.bias);
    }
}
