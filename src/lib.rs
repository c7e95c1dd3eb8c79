//! Classifier training with per-epoch loss/accuracy/precision/recall/F1,
//! step learning-rate decay, best-epoch tracking and learning-curve reports.

pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod metrics;
pub mod data;
pub mod train;
pub mod report;
pub mod config;
pub mod error;
pub mod session;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::{Layer, Parameter};
pub use network::{Classifier, Network};
pub use loss::cross_entropy::CrossEntropyLoss;
pub use optim::{Adam, Optimizer, Sgd, StepLr};
pub use metrics::{argmax, ConfusionMatrix, MetricAggregator};
pub use data::{Batch, BatchSource, Dataset, InMemorySource, Split};
pub use train::{
    train_loop, BestModelTracker, BestRecord, EpochMetrics, EpochRecord, EvalMetrics, History,
    RunOutcome, RunStatus, TrainConfig, TrainingState,
};
pub use report::{CurveReporter, JsonCurveReporter, PngCurveReporter};
pub use config::Config;
pub use error::{Result, RunError, TrainError};
