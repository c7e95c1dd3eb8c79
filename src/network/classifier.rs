use crate::error::Result;
use crate::layers::dense::Parameter;

/// Anything that maps a batch of samples to per-class scores and can be
/// trained by gradient steps.
///
/// The training loop only talks to a model through this trait. `predict`
/// takes `&self`, so an evaluation pass cannot change parameters.
pub trait Classifier {
    /// Width of one input sample.
    fn input_size(&self) -> usize;

    /// Length of every score vector.
    fn num_classes(&self) -> usize;

    /// Training-mode forward pass. Keeps whatever `backward` needs.
    fn forward(&mut self, inputs: &[Vec<f64>]) -> Result<Vec<Vec<f64>>>;

    /// Evaluation-mode forward pass.
    fn predict(&self, inputs: &[Vec<f64>]) -> Result<Vec<Vec<f64>>>;

    /// Accumulates parameter gradients for the most recent `forward`, given
    /// ∂L/∂scores (same shape as the scores it returned).
    fn backward(&mut self, score_grads: &[Vec<f64>]) -> Result<()>;

    /// Every trainable parameter, in a stable order.
    fn parameters(&mut self) -> Vec<&mut Parameter>;
}
