//! Step learning-rate schedule

use serde::{Deserialize, Serialize};

use super::Optimizer;

/// Multiplies the initial rate by `gamma` every `step_size` epochs.
///
/// Epochs are 0-indexed: `learning_rate_at(e) = initial_lr * gamma^(e / step_size)`
/// with integer division. Epochs `0..step_size` run at `initial_lr`, epoch
/// `step_size` is the first decayed one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepLr {
    pub initial_lr: f64,
    pub step_size: usize,
    pub gamma: f64,
}

impl StepLr {
    pub fn new(initial_lr: f64, step_size: usize, gamma: f64) -> StepLr {
        StepLr { initial_lr, step_size, gamma }
    }

    /// Rate that epoch `epoch` trains with.
    pub fn learning_rate_at(&self, epoch: usize) -> f64 {
        let decays = epoch / self.step_size.max(1);
        self.initial_lr * self.gamma.powi(decays.min(i32::MAX as usize) as i32)
    }

    /// Called once `completed_epoch` has finished: sets the rate for the next
    /// epoch and returns it. Recomputed from scratch, so repeated calls with
    /// the same epoch leave the optimizer in the same state.
    pub fn advance<O: Optimizer + ?Sized>(&self, completed_epoch: usize, optimizer: &mut O) -> f64 {
        let lr = self.learning_rate_at(completed_epoch + 1);
        optimizer.set_learning_rate(lr);
        lr
    }
}
