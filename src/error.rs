//! Error types for ferrite-train

use thiserror::Error;

use crate::data::Split;
use crate::train::TrainingState;

#[derive(Error, Debug)]
pub enum TrainError {
    /// Empty split, mismatched batch shapes, out-of-range labels, malformed
    /// dataset files.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Non-finite {split} loss ({loss}) in epoch {epoch}")]
    NumericInstability {
        epoch: usize,
        split: Split,
        loss: f64,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrainError>;

/// A run that aborted. `state` holds everything committed before the failing
/// epoch, so the curves up to that point can still be reported.
#[derive(Error, Debug)]
#[error("training aborted after {} completed epochs: {source}", .state.completed_epochs())]
pub struct RunError {
    #[source]
    pub source: TrainError,
    pub state: TrainingState,
}
