use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainError};

/// Named partition of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    Train,
    Eval,
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Split::Train => write!(f, "train"),
            Split::Eval => write!(f, "eval"),
        }
    }
}

/// Samples and their class indices, index-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    inputs: Vec<Vec<f64>>,
    labels: Vec<usize>,
}

impl Batch {
    /// Rejects empty batches, length mismatches and ragged samples.
    pub fn new(inputs: Vec<Vec<f64>>, labels: Vec<usize>) -> Result<Batch> {
        if inputs.is_empty() {
            return Err(TrainError::InvalidInput("batch has no samples".to_owned()));
        }
        if inputs.len() != labels.len() {
            return Err(TrainError::InvalidInput(format!(
                "batch has {} samples but {} labels",
                inputs.len(),
                labels.len()
            )));
        }
        let width = inputs[0].len();
        if let Some(i) = inputs.iter().position(|x| x.len() != width) {
            return Err(TrainError::InvalidInput(format!(
                "sample {} has {} features, expected {}",
                i,
                inputs[i].len(),
                width
            )));
        }
        Ok(Batch { inputs, labels })
    }

    pub fn inputs(&self) -> &[Vec<f64>] {
        &self.inputs
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Produces labeled batches for a split.
///
/// Each split is finite; `reset` restarts it and is called at the start of
/// every pass. `next_batch` blocks until a batch is ready and returns
/// `Ok(None)` at the end of the split. Errors from the backing store are
/// returned as-is; retrying is up to the implementation.
pub trait BatchSource {
    fn reset(&mut self, split: Split) -> Result<()>;

    fn next_batch(&mut self, split: Split) -> Result<Option<Batch>>;
}
