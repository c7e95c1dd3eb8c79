use rand::Rng;

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};
use crate::error::{Result, TrainError};

/// A trainable tensor together with its accumulated gradient.
///
/// `values` and `grads` always have the same length. Optimizers bind to
/// parameters through this type only.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub values: Vec<f64>,
    pub grads: Vec<f64>,
}

impl Parameter {
    pub fn new(values: Vec<f64>) -> Parameter {
        let grads = vec![0.0; values.len()];
        Parameter { values, grads }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn zero_grad(&mut self) {
        self.grads.iter_mut().for_each(|g| *g = 0.0);
    }
}

/// Fully connected layer: `a = f(x·W + b)`.
#[derive(Debug, Clone)]
pub struct Layer {
    pub input_size: usize,
    pub size: usize,
    /// `input_size × size`, row-major.
    pub weights: Parameter,
    pub biases: Parameter,
    pub activator: ActivationFunction,
    // Cached by the training forward pass for `backward`.
    last_input: Option<Matrix>,
    last_pre_activation: Option<Matrix>,
}

impl Layer {
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Layer {
        let weights = if activation.prefers_he_init() {
            Matrix::he(input_size, size, rng)
        } else {
            Matrix::xavier(input_size, size, rng)
        };

        Layer {
            input_size,
            size,
            weights: Parameter::new(weights.data),
            biases: Parameter::new(vec![0.0; size]),
            activator: activation,
            last_input: None,
            last_pre_activation: None,
        }
    }

    fn weight_matrix(&self) -> Matrix {
        Matrix {
            rows: self.input_size,
            cols: self.size,
            data: self.weights.values.clone(),
        }
    }

    fn pre_activation(&self, input: &Matrix) -> Matrix {
        let mut z = input.matmul(&self.weight_matrix());
        z.add_row_vector(&self.biases.values);
        z
    }

    /// Evaluation forward pass; leaves the layer untouched.
    pub fn infer(&self, input: &Matrix) -> Matrix {
        self.pre_activation(input).map(|x| self.activator.function(x))
    }

    /// Training forward pass; caches what `backward` needs.
    pub fn feed_from(&mut self, input: Matrix) -> Matrix {
        let z = self.pre_activation(&input);
        let a = z.map(|x| self.activator.function(x));
        self.last_input = Some(input);
        self.last_pre_activation = Some(z);
        a
    }

    /// Accumulates parameter gradients from `grad_output` (∂L/∂a, one row per
    /// sample) and returns ∂L/∂x for the previous layer.
    pub fn backward(&mut self, grad_output: &Matrix) -> Result<Matrix> {
        let (input, z) = match (&self.last_input, &self.last_pre_activation) {
            (Some(input), Some(z)) => (input, z),
            _ => {
                return Err(TrainError::InvalidInput(
                    "backward called before a training forward pass".to_owned(),
                ))
            }
        };
        if (grad_output.rows, grad_output.cols) != (z.rows, z.cols) {
            return Err(TrainError::InvalidInput(format!(
                "gradient shape {}x{} does not match layer output {}x{}",
                grad_output.rows, grad_output.cols, z.rows, z.cols
            )));
        }

        // δ = ∂L/∂a ⊙ f'(z)
        let delta = grad_output.hadamard(&z.map(|x| self.activator.derivative(x)));

        let w_grad = input.transpose().matmul(&delta);
        for (g, d) in self.weights.grads.iter_mut().zip(&w_grad.data) {
            *g += d;
        }
        for (g, d) in self.biases.grads.iter_mut().zip(delta.sum_rows()) {
            *g += d;
        }

        Ok(delta.matmul(&self.weight_matrix().transpose()))
    }
}
