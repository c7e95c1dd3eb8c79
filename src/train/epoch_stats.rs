use std::fmt;

use serde::{Serialize, Deserialize};

/// Loss and accuracy of one pass over one split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Sum of batch losses divided by the batch count.
    pub loss: f64,
    /// Percentage in [0, 100].
    pub accuracy: f64,
}

/// Evaluation-split metrics: loss/accuracy plus macro precision, recall and
/// F1 (each in [0, 1]) over the classes present in that pass's true labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub loss: f64,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// The per-epoch record: logged once per epoch and, when a progress channel
/// is configured, sent to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    /// 1-based epoch number.
    pub epoch: usize,
    pub total_epochs: usize,
    pub train_loss: f64,
    pub test_loss: f64,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// 1-based epoch of the best record so far.
    pub best_epoch: usize,
    pub best_accuracy: f64,
    /// Rate after this epoch's scheduler step, i.e. what the next epoch uses.
    pub learning_rate: f64,
    /// Wall-clock duration of the epoch in milliseconds.
    pub elapsed_ms: u64,
}

/// One line of space-separated `key=value` pairs in a fixed order.
impl fmt::Display for EpochRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "epoch={} total_epochs={} train_loss={:.4} test_loss={:.4} train_acc={:.2} test_acc={:.2} \
             precision={:.4} recall={:.4} f1={:.4} best_epoch={} best_acc={:.2} lr={:.6}",
            self.epoch,
            self.total_epochs,
            self.train_loss,
            self.test_loss,
            self.train_accuracy,
            self.test_accuracy,
            self.precision,
            self.recall,
            self.f1,
            self.best_epoch,
            self.best_accuracy,
            self.learning_rate,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> EpochRecord {
        EpochRecord {
            epoch: 3,
            total_epochs: 10,
            train_loss: 0.5,
            test_loss: 0.625,
            train_accuracy: 81.25,
            test_accuracy: 78.5,
            precision: 0.8,
            recall: 0.75,
            f1: 0.77,
            best_epoch: 2,
            best_accuracy: 79.0,
            learning_rate: 0.05,
            elapsed_ms: 12,
        }
    }

    #[test]
    fn test_display_field_order() {
        let line = record().to_string();
        let keys: Vec<&str> = line
            .split_whitespace()
            .map(|kv| kv.split('=').next().unwrap())
            .collect();
        assert_eq!(
            keys,
            vec![
                "epoch", "total_epochs", "train_loss", "test_loss", "train_acc", "test_acc", "precision",
                "recall", "f1", "best_epoch", "best_acc", "lr",
            ]
        );
        assert!(line.starts_with("epoch=3 total_epochs=10 train_loss=0.5000"));
        assert!(line.ends_with("lr=0.050000"));
    }

    #[test]
    fn test_json_roundtrip() {
        let json = serde_json::to_string(&record()).unwrap();
        let back: EpochRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record());
    }
}
