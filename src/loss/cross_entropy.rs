use crate::error::{Result, TrainError};

/// Softmax cross-entropy on raw class scores with integer class labels.
///
/// The softmax is applied here, so the classifier's output layer stays linear.
/// With `label_smoothing = ε` the target puts `1 - ε + ε/K` on the true class
/// and `ε/K` on every other class.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CrossEntropyLoss {
    pub label_smoothing: f64,
}

impl CrossEntropyLoss {
    pub fn new(label_smoothing: f64) -> CrossEntropyLoss {
        CrossEntropyLoss { label_smoothing }
    }

    /// Mean loss over the batch and the gradient w.r.t. every score,
    /// already divided by the batch length.
    pub fn loss_and_grad(&self, scores: &[Vec<f64>], labels: &[usize]) -> Result<(f64, Vec<Vec<f64>>)> {
        self.check(scores, labels)?;
        let n = scores.len() as f64;

        let mut total = 0.0;
        let mut grads = Vec::with_capacity(scores.len());
        for (row, &label) in scores.iter().zip(labels) {
            let log_probs = log_softmax(row);
            let target = self.target(row.len(), label);
            total -= target.iter().zip(&log_probs).map(|(t, lp)| t * lp).sum::<f64>();
            grads.push(
                log_probs.iter().zip(&target)
                    .map(|(lp, t)| (lp.exp() - t) / n)
                    .collect(),
            );
        }
        Ok((total / n, grads))
    }

    /// Mean loss over the batch, no gradient.
    pub fn loss(&self, scores: &[Vec<f64>], labels: &[usize]) -> Result<f64> {
        self.check(scores, labels)?;
        let total: f64 = scores.iter().zip(labels)
            .map(|(row, &label)| {
                let target = self.target(row.len(), label);
                -target.iter().zip(log_softmax(row)).map(|(t, lp)| t * lp).sum::<f64>()
            })
            .sum();
        Ok(total / scores.len() as f64)
    }

    fn target(&self, k: usize, label: usize) -> Vec<f64> {
        let off = self.label_smoothing / k as f64;
        let mut t = vec![off; k];
        t[label] += 1.0 - self.label_smoothing;
        t
    }

    fn check(&self, scores: &[Vec<f64>], labels: &[usize]) -> Result<()> {
        if scores.is_empty() {
            return Err(TrainError::InvalidInput("loss over an empty batch".to_owned()));
        }
        if scores.len() != labels.len() {
            return Err(TrainError::InvalidInput(format!(
                "{} score rows but {} labels",
                scores.len(),
                labels.len()
            )));
        }
        for (row, &label) in scores.iter().zip(labels) {
            if label >= row.len() {
                return Err(TrainError::InvalidInput(format!(
                    "label {} out of range for {} classes",
                    label,
                    row.len()
                )));
            }
        }
        Ok(())
    }
}

/// Numerically stable `log(softmax(x))` via log-sum-exp.
pub fn log_softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let lse = max + scores.iter().map(|s| (s - max).exp()).sum::<f64>().ln();
    scores.iter().map(|s| s - lse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_uniform_scores_give_log_k() {
        let ce = CrossEntropyLoss::default();
        let loss = ce.loss(&[vec![0.0, 0.0, 0.0, 0.0]], &[2]).unwrap();
        assert_abs_diff_eq!(loss, 4f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_large_scores_stay_finite() {
        let ce = CrossEntropyLoss::default();
        let loss = ce.loss(&[vec![1000.0, -1000.0]], &[1]).unwrap();
        assert!(loss.is_finite());
        assert_abs_diff_eq!(loss, 2000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_grad_matches_finite_difference() {
        let ce = CrossEntropyLoss::new(0.1);
        let scores = vec![vec![0.3, -0.2, 1.1], vec![0.0, 0.5, -0.5]];
        let labels = [2, 0];
        let (loss, grads) = ce.loss_and_grad(&scores, &labels).unwrap();
        assert_abs_diff_eq!(loss, ce.loss(&scores, &labels).unwrap(), epsilon = 1e-12);

        let h = 1e-6;
        for i in 0..2 {
            for j in 0..3 {
                let mut plus = scores.clone();
                plus[i][j] += h;
                let mut minus = scores.clone();
                minus[i][j] -= h;
                let numeric = (ce.loss(&plus, &labels).unwrap() - ce.loss(&minus, &labels).unwrap()) / (2.0 * h);
                assert_abs_diff_eq!(grads[i][j], numeric, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_label_out_of_range() {
        let ce = CrossEntropyLoss::default();
        assert!(matches!(
            ce.loss(&[vec![0.0, 1.0]], &[2]),
            Err(TrainError::InvalidInput(_))
        ));
    }
}
