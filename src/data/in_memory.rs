use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::batch::{Batch, BatchSource, Split};
use crate::error::{Result, TrainError};

/// A fully loaded labeled dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub inputs: Vec<Vec<f64>>,
    pub labels: Vec<usize>,
}

impl Dataset {
    pub fn new(inputs: Vec<Vec<f64>>, labels: Vec<usize>) -> Result<Dataset> {
        if inputs.len() != labels.len() {
            return Err(TrainError::InvalidInput(format!(
                "dataset has {} samples but {} labels",
                inputs.len(),
                labels.len()
            )));
        }
        Ok(Dataset { inputs, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Width of the first sample, 0 when empty.
    pub fn input_size(&self) -> usize {
        self.inputs.first().map_or(0, |x| x.len())
    }

    /// Largest label plus one.
    pub fn num_classes(&self) -> usize {
        self.labels.iter().max().map_or(0, |&m| m + 1)
    }

    /// Splits off the last `fraction` of a seeded shuffle as a second dataset.
    pub fn split_off(mut self, fraction: f64, seed: u64) -> (Dataset, Dataset) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(&mut StdRng::seed_from_u64(seed));
        let cut = self.len() - ((self.len() as f64 * fraction).round() as usize).min(self.len());

        let mut inputs: Vec<Option<Vec<f64>>> = self.inputs.drain(..).map(Some).collect();
        let mut take = |idx: &[usize]| {
            let mut ds = Dataset::default();
            for &i in idx {
                if let Some(x) = inputs[i].take() {
                    ds.inputs.push(x);
                    ds.labels.push(self.labels[i]);
                }
            }
            ds
        };
        let first = take(&order[..cut]);
        let second = take(&order[cut..]);
        (first, second)
    }
}

/// `BatchSource` over two in-memory datasets.
///
/// The training split is reshuffled on every `reset` from a seeded RNG, so a
/// run is reproducible; the evaluation split is always served in order.
pub struct InMemorySource {
    train: Dataset,
    eval: Dataset,
    batch_size: usize,
    rng: StdRng,
    train_order: Vec<usize>,
    train_cursor: usize,
    eval_cursor: usize,
}

impl InMemorySource {
    pub fn new(train: Dataset, eval: Dataset, batch_size: usize, seed: u64) -> Result<InMemorySource> {
        if batch_size == 0 {
            return Err(TrainError::InvalidInput("batch_size must be at least 1".to_owned()));
        }
        let train_order = (0..train.len()).collect();
        Ok(InMemorySource {
            train,
            eval,
            batch_size,
            rng: StdRng::seed_from_u64(seed),
            train_order,
            train_cursor: 0,
            eval_cursor: 0,
        })
    }

    fn gather(ds: &Dataset, idx: &[usize]) -> Result<Batch> {
        Batch::new(
            idx.iter().map(|&i| ds.inputs[i].clone()).collect(),
            idx.iter().map(|&i| ds.labels[i]).collect(),
        )
    }
}

impl BatchSource for InMemorySource {
    fn reset(&mut self, split: Split) -> Result<()> {
        match split {
            Split::Train => {
                self.train_order = (0..self.train.len()).collect();
                self.train_order.shuffle(&mut self.rng);
                self.train_cursor = 0;
            }
            Split::Eval => self.eval_cursor = 0,
        }
        Ok(())
    }

    fn next_batch(&mut self, split: Split) -> Result<Option<Batch>> {
        match split {
            Split::Train => {
                let n = self.train_order.len();
                if self.train_cursor >= n {
                    return Ok(None);
                }
                let end = (self.train_cursor + self.batch_size).min(n);
                let batch = Self::gather(&self.train, &self.train_order[self.train_cursor..end])?;
                self.train_cursor = end;
                Ok(Some(batch))
            }
            Split::Eval => {
                let n = self.eval.len();
                if self.eval_cursor >= n {
                    return Ok(None);
                }
                let end = (self.eval_cursor + self.batch_size).min(n);
                let idx: Vec<usize> = (self.eval_cursor..end).collect();
                let batch = Self::gather(&self.eval, &idx)?;
                self.eval_cursor = end;
                Ok(Some(batch))
            }
        }
    }
}
