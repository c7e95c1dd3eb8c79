//! Confusion matrix and macro-averaged precision/recall/F1

use std::collections::BTreeSet;

use serde::Serialize;

/// Per-class counts for one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassScores {
    pub class: usize,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Unweighted mean of the per-class scores.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MacroScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// `counts[true][predicted]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    pub num_classes: usize,
    counts: Vec<Vec<usize>>,
    present: BTreeSet<usize>,
}

impl ConfusionMatrix {
    /// Builds the matrix from `(predicted, true)` pairs. The class count is
    /// the largest label seen on either side plus one.
    pub fn from_pairs(pairs: &[(usize, usize)]) -> ConfusionMatrix {
        let num_classes = pairs.iter().map(|&(p, t)| p.max(t) + 1).max().unwrap_or(0);
        let mut counts = vec![vec![0usize; num_classes]; num_classes];
        let mut present = BTreeSet::new();
        for &(pred, truth) in pairs {
            counts[truth][pred] += 1;
            present.insert(truth);
        }
        ConfusionMatrix { num_classes, counts, present }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.num_classes).map(|c| self.counts[c][c]).sum()
    }

    /// Scores for one class. Precision and recall are 0 when their
    /// denominator is 0; F1 is 0 when both are 0.
    pub fn class_scores(&self, class: usize) -> ClassScores {
        let tp = self.counts[class][class];
        let fp = (0..self.num_classes).filter(|&t| t != class).map(|t| self.counts[t][class]).sum::<usize>();
        let fn_ = (0..self.num_classes).filter(|&p| p != class).map(|p| self.counts[class][p]).sum::<usize>();

        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        ClassScores {
            class,
            true_positives: tp,
            false_positives: fp,
            false_negatives: fn_,
            precision,
            recall,
            f1,
        }
    }

    /// Scores for every class that occurs among the true labels, ascending.
    pub fn per_class(&self) -> Vec<ClassScores> {
        self.present.iter().map(|&c| self.class_scores(c)).collect()
    }

    /// Macro average over the classes present in the true labels.
    pub fn macro_scores(&self) -> MacroScores {
        let per_class = self.per_class();
        if per_class.is_empty() {
            return MacroScores::default();
        }
        let n = per_class.len() as f64;
        MacroScores {
            precision: per_class.iter().map(|s| s.precision).sum::<f64>() / n,
            recall: per_class.iter().map(|s| s.recall).sum::<f64>() / n,
            f1: per_class.iter().map(|s| s.f1).sum::<f64>() / n,
        }
    }
}

/// Shorthand for `ConfusionMatrix::from_pairs(pairs).macro_scores()`.
pub fn macro_scores(pairs: &[(usize, usize)]) -> MacroScores {
    ConfusionMatrix::from_pairs(pairs).macro_scores()
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}
