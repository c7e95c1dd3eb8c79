use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};

use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::optim::scheduler::StepLr;
use crate::train::epoch_stats::EpochRecord;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`:      total number of epochs, counting any already in the
///                   `TrainingState` passed to `train_loop`
/// - `scheduler`:   step learning-rate policy, advanced once per epoch
/// - `loss`:        classification loss used by both phases
/// - `progress_tx`: optional channel sender; one `EpochRecord` is sent per
///                   completed epoch.  If the receiver is dropped the run
///                   ends early as a partial run.
/// - `stop_flag`:   optional atomic flag, checked before every batch and
///                   between epochs; when set the in-flight epoch is
///                   discarded and the run ends as a partial run.
pub struct TrainConfig {
    pub epochs: usize,
    pub scheduler: StepLr,
    pub loss: CrossEntropyLoss,
    pub progress_tx: Option<mpsc::Sender<EpochRecord>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig` with plain cross-entropy, no progress
    /// channel and no stop flag.
    pub fn new(epochs: usize, scheduler: StepLr) -> Self {
        TrainConfig {
            epochs,
            scheduler,
            loss: CrossEntropyLoss::default(),
            progress_tx: None,
            stop_flag: None,
        }
    }
}
