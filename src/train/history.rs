use serde::{Deserialize, Serialize};

use crate::train::epoch_stats::{EpochMetrics, EvalMetrics};

/// The four learning-curve series, one element per completed epoch.
///
/// Append-only: the only writer is the training loop, which pushes all four
/// values at once, so the series always have equal length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    train_loss: Vec<f64>,
    test_loss: Vec<f64>,
    train_accuracy: Vec<f64>,
    test_accuracy: Vec<f64>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, train: &EpochMetrics, eval: &EvalMetrics) {
        self.train_loss.push(train.loss);
        self.test_loss.push(eval.loss);
        self.train_accuracy.push(train.accuracy);
        self.test_accuracy.push(eval.accuracy);
    }

    /// Number of completed epochs.
    pub fn len(&self) -> usize {
        self.train_loss.len()
    }

    pub fn is_empty(&self) -> bool {
        self.train_loss.is_empty()
    }

    pub fn train_loss(&self) -> &[f64] {
        &self.train_loss
    }

    pub fn test_loss(&self) -> &[f64] {
        &self.test_loss
    }

    pub fn train_accuracy(&self) -> &[f64] {
        &self.train_accuracy
    }

    pub fn test_accuracy(&self) -> &[f64] {
        &self.test_accuracy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_series_aligned() {
        let mut h = History::new();
        assert!(h.is_empty());
        let eval = EvalMetrics { loss: 0.7, accuracy: 60.0, precision: 0.5, recall: 0.5, f1: 0.5 };
        h.push(&EpochMetrics { loss: 0.9, accuracy: 55.0 }, &eval);
        h.push(&EpochMetrics { loss: 0.8, accuracy: 58.0 }, &eval);
        assert_eq!(h.len(), 2);
        assert_eq!(h.train_loss(), &[0.9, 0.8]);
        assert_eq!(h.test_loss(), &[0.7, 0.7]);
        assert_eq!(h.train_accuracy(), &[55.0, 58.0]);
        assert_eq!(h.test_accuracy(), &[60.0, 60.0]);
    }
}
