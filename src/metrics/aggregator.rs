//! Per-pass loss/accuracy accumulation

use crate::error::{Result, TrainError};
use crate::metrics::confusion::ConfusionMatrix;
use crate::train::epoch_stats::{EpochMetrics, EvalMetrics};

/// Index of the highest score. Ties go to the lowest index and NaN never
/// wins; `None` only for an empty or all-NaN slice.
pub fn argmax(scores: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &s) in scores.iter().enumerate() {
        if s.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}

/// Accumulates one pass (one split, one epoch).
///
/// Training passes only count loss and correctness; evaluation passes also
/// keep every `(predicted, true)` pair for the macro scores.
#[derive(Debug, Clone, Default)]
pub struct MetricAggregator {
    loss_sum: f64,
    batch_count: usize,
    correct: usize,
    total: usize,
    pairs: Option<Vec<(usize, usize)>>,
}

impl MetricAggregator {
    pub fn for_training() -> Self {
        Self::default()
    }

    pub fn for_evaluation() -> Self {
        MetricAggregator {
            pairs: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Adds one batch: its scalar loss, the class scores and the true labels.
    pub fn record_batch(&mut self, loss: f64, scores: &[Vec<f64>], labels: &[usize]) -> Result<()> {
        if scores.len() != labels.len() {
            return Err(TrainError::InvalidInput(format!(
                "{} score rows but {} labels",
                scores.len(),
                labels.len()
            )));
        }

        for (row, &label) in scores.iter().zip(labels) {
            let pred = argmax(row).ok_or_else(|| {
                TrainError::InvalidInput("score row has no comparable value".to_owned())
            })?;
            if pred == label {
                self.correct += 1;
            }
            if let Some(pairs) = self.pairs.as_mut() {
                pairs.push((pred, label));
            }
        }

        self.loss_sum += loss;
        self.batch_count += 1;
        self.total += labels.len();
        Ok(())
    }

    pub fn batch_count(&self) -> usize {
        self.batch_count
    }

    /// `(predicted, true)` pairs seen so far; empty for training passes.
    pub fn pairs(&self) -> &[(usize, usize)] {
        self.pairs.as_deref().unwrap_or(&[])
    }

    /// Clears the counters, keeping the pass kind.
    pub fn reset(&mut self) {
        let collect = self.pairs.is_some();
        *self = Self::default();
        if collect {
            self.pairs = Some(Vec::new());
        }
    }

    /// Mean batch loss and percentage accuracy. An empty pass is an error.
    pub fn finish(&self) -> Result<EpochMetrics> {
        if self.batch_count == 0 || self.total == 0 {
            return Err(TrainError::InvalidInput(
                "split produced no samples; loss and accuracy are undefined".to_owned(),
            ));
        }
        Ok(EpochMetrics {
            loss: self.loss_sum / self.batch_count as f64,
            accuracy: 100.0 * self.correct as f64 / self.total as f64,
        })
    }

    /// `finish` plus macro precision/recall/F1 over the collected pairs.
    pub fn finish_eval(&self) -> Result<EvalMetrics> {
        let base = self.finish()?;
        let scores = ConfusionMatrix::from_pairs(self.pairs()).macro_scores();
        Ok(EvalMetrics {
            loss: base.loss,
            accuracy: base.accuracy,
            precision: scores.precision,
            recall: scores.recall,
            f1: scores.f1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn one_hot(class: usize, k: usize) -> Vec<f64> {
        let mut v = vec![0.0; k];
        v[class] = 1.0;
        v
    }

    #[test]
    fn test_argmax_ties_pick_first() {
        assert_eq!(argmax(&[0.2, 0.9, 0.9]), Some(1));
        assert_eq!(argmax(&[1.0, 1.0]), Some(0));
        assert_eq!(argmax(&[f64::NAN, -1.0]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_two_class_pass() {
        let mut agg = MetricAggregator::for_evaluation();
        let preds = [0, 1, 1, 1];
        let truth = [0, 0, 1, 1];
        let scores: Vec<Vec<f64>> = preds.iter().map(|&p| one_hot(p, 2)).collect();
        agg.record_batch(0.4, &scores[..2], &truth[..2]).unwrap();
        agg.record_batch(0.2, &scores[2..], &truth[2..]).unwrap();

        let m = agg.finish_eval().unwrap();
        assert_abs_diff_eq!(m.accuracy, 75.0);
        assert_abs_diff_eq!(m.loss, 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(m.recall, 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(m.precision, 5.0 / 6.0, epsilon = 1e-12);

        let cm = ConfusionMatrix::from_pairs(agg.pairs());
        assert_abs_diff_eq!(cm.class_scores(0).precision, 1.0);
        assert_abs_diff_eq!(cm.class_scores(0).recall, 0.5);
    }

    #[test]
    fn test_loss_is_mean_over_batches_not_samples() {
        let mut agg = MetricAggregator::for_training();
        agg.record_batch(1.0, &vec![one_hot(0, 2); 3], &[0, 0, 0]).unwrap();
        agg.record_batch(3.0, &[one_hot(0, 2)], &[1]).unwrap();
        let m = agg.finish().unwrap();
        assert_abs_diff_eq!(m.loss, 2.0);
        assert_abs_diff_eq!(m.accuracy, 75.0);
        assert!(agg.pairs().is_empty());
    }

    #[test]
    fn test_empty_pass_is_invalid_input() {
        let agg = MetricAggregator::for_evaluation();
        assert!(matches!(agg.finish(), Err(TrainError::InvalidInput(_))));
        assert!(matches!(agg.finish_eval(), Err(TrainError::InvalidInput(_))));
    }

    #[test]
    fn test_reset_keeps_pass_kind() {
        let mut agg = MetricAggregator::for_evaluation();
        agg.record_batch(1.0, &[one_hot(1, 2)], &[1]).unwrap();
        agg.reset();
        assert_eq!(agg.batch_count(), 0);
        assert!(agg.pairs().is_empty());
        agg.record_batch(1.0, &[one_hot(1, 2)], &[0]).unwrap();
        assert_eq!(agg.pairs(), &[(1, 0)]);
    }
}
