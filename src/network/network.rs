use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{activation::activation::ActivationFunction, layers::dense::{Layer, Parameter}};
use crate::error::{Result, TrainError};
use crate::math::matrix::Matrix;
use crate::network::classifier::Classifier;

/// Multi-layer perceptron classifier. The last layer is linear and produces
/// raw class scores.
#[derive(Debug, Clone)]
pub struct Network {
    pub layers: Vec<Layer>,
}

impl Network {
    /// Builds a network from (size, input_size, activation) tuples.
    pub fn new(layer_specs: Vec<(usize, usize, ActivationFunction)>, seed: u64) -> Network {
        let mut rng = StdRng::seed_from_u64(seed);
        let layers = layer_specs.into_iter()
            .map(|(size, input_size, activation)| Layer::new(size, input_size, activation, &mut rng))
            .collect();
        Network { layers }
    }

    /// `input_size → hidden[0] → … → num_classes`, hidden layers sharing one
    /// activation, output layer linear.
    pub fn mlp(
        input_size: usize,
        hidden: &[usize],
        num_classes: usize,
        activation: ActivationFunction,
        seed: u64,
    ) -> Network {
        let mut specs = Vec::with_capacity(hidden.len() + 1);
        let mut fan_in = input_size;
        for &size in hidden {
            specs.push((size, fan_in, activation));
            fan_in = size;
        }
        specs.push((num_classes, fan_in, ActivationFunction::Identity));
        Network::new(specs, seed)
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(|l| l.weights.len() + l.biases.len()).sum()
    }

    fn check_inputs(&self, inputs: &[Vec<f64>]) -> Result<Matrix> {
        let width = self.input_size();
        if let Some((i, row)) = inputs.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(TrainError::InvalidInput(format!(
                "sample {} has {} features, network expects {}",
                i,
                row.len(),
                width
            )));
        }
        Ok(Matrix::from_rows(inputs))
    }
}

impl Classifier for Network {
    fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |l| l.input_size)
    }

    fn num_classes(&self) -> usize {
        self.layers.last().map_or(0, |l| l.size)
    }

    fn forward(&mut self, inputs: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let mut current = self.check_inputs(inputs)?;
        for layer in &mut self.layers {
            current = layer.feed_from(current);
        }
        Ok(current.to_rows())
    }

    fn predict(&self, inputs: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let mut current = self.check_inputs(inputs)?;
        for layer in &self.layers {
            current = layer.infer(&current);
        }
        Ok(current.to_rows())
    }

    fn backward(&mut self, score_grads: &[Vec<f64>]) -> Result<()> {
        let mut delta = Matrix::from_rows(score_grads);
        for layer in self.layers.iter_mut().rev() {
            delta = layer.backward(&delta)?;
        }
        Ok(())
    }

    fn parameters(&mut self) -> Vec<&mut Parameter> {
        self.layers
            .iter_mut()
            .flat_map(|l| [&mut l.weights, &mut l.biases])
            .collect()
    }
}
