pub mod best;
pub mod epoch_stats;
pub mod history;
pub mod loop_fn;
pub mod train_config;

pub use best::{BestModelTracker, BestRecord};
pub use epoch_stats::{EpochMetrics, EpochRecord, EvalMetrics};
pub use history::History;
pub use loop_fn::{train_loop, RunOutcome, RunStatus, TrainingState};
pub use train_config::TrainConfig;
