use serde::{Deserialize, Serialize};

use crate::train::epoch_stats::EvalMetrics;

/// Metrics of the epoch with the highest evaluation accuracy so far.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BestRecord {
    /// 1-based epoch number; 0 until an epoch has been accepted.
    pub epoch: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Keeps the single best epoch by evaluation accuracy.
///
/// Only a strictly higher accuracy replaces the record, so ties keep the
/// earliest epoch. Starts at epoch 0 / accuracy 0.0; an epoch with exactly 0%
/// accuracy therefore never becomes the best.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BestModelTracker {
    best: BestRecord,
}

impl BestModelTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when `metrics` became the new best.
    pub fn consider(&mut self, epoch: usize, metrics: &EvalMetrics) -> bool {
        if metrics.accuracy > self.best.accuracy {
            self.best = BestRecord {
                epoch,
                accuracy: metrics.accuracy,
                precision: metrics.precision,
                recall: metrics.recall,
                f1: metrics.f1,
            };
            true
        } else {
            false
        }
    }

    pub fn best(&self) -> &BestRecord {
        &self.best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(accuracy: f64, f1: f64) -> EvalMetrics {
        EvalMetrics { loss: 1.0, accuracy, precision: f1, recall: f1, f1 }
    }

    #[test]
    fn test_first_epoch_replaces_initial() {
        let mut t = BestModelTracker::new();
        assert_eq!(t.best().epoch, 0);
        assert!(t.consider(1, &eval(10.0, 0.1)));
        assert_eq!(t.best().epoch, 1);
    }

    #[test]
    fn test_zero_accuracy_never_replaces() {
        let mut t = BestModelTracker::new();
        assert!(!t.consider(1, &eval(0.0, 0.0)));
        assert_eq!(*t.best(), BestRecord::default());
    }

    #[test]
    fn test_ties_keep_earliest() {
        let mut t = BestModelTracker::new();
        t.consider(1, &eval(80.0, 0.7));
        assert!(!t.consider(2, &eval(80.0, 0.9)));
        assert_eq!(t.best().epoch, 1);
        assert_eq!(t.best().f1, 0.7);
    }

    #[test]
    fn test_worse_metrics_leave_record_bit_identical() {
        let mut t = BestModelTracker::new();
        t.consider(3, &eval(91.25, 0.8765));
        let before = *t.best();
        for _ in 0..3 {
            assert!(!t.consider(4, &eval(50.0, 0.99)));
        }
        let after = *t.best();
        assert_eq!(before.epoch, after.epoch);
        assert_eq!(before.accuracy.to_bits(), after.accuracy.to_bits());
        assert_eq!(before.precision.to_bits(), after.precision.to_bits());
        assert_eq!(before.recall.to_bits(), after.recall.to_bits());
        assert_eq!(before.f1.to_bits(), after.f1.to_bits());
    }
}
