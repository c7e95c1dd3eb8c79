//! Optimizer trait

use crate::layers::dense::Parameter;

/// Applies parameter updates from accumulated gradients.
///
/// Per-parameter state (momentum buffers, Adam moments) is keyed by position,
/// so callers must pass the parameters in the same order on every call.
pub trait Optimizer {
    /// One update from the gradients currently stored in `params`.
    fn step(&mut self, params: &mut [&mut Parameter]);

    /// Clears the accumulated gradients.
    fn zero_grad(&mut self, params: &mut [&mut Parameter]) {
        for param in params.iter_mut() {
            param.zero_grad();
        }
    }

    fn learning_rate(&self) -> f64;

    fn set_learning_rate(&mut self, lr: f64);
}
