pub mod aggregator;
pub mod confusion;

pub use aggregator::{argmax, MetricAggregator};
pub use confusion::{macro_scores, ClassScores, ConfusionMatrix, MacroScores};
