use std::sync::atomic::Ordering;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::data::batch::{BatchSource, Split};
use crate::error::{Result, RunError, TrainError};
use crate::metrics::aggregator::MetricAggregator;
use crate::metrics::confusion::ConfusionMatrix;
use crate::network::classifier::Classifier;
use crate::optim::optimizer::Optimizer;
use crate::train::best::BestModelTracker;
use crate::train::epoch_stats::{EpochMetrics, EpochRecord};
use crate::train::history::History;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// State threaded through the run
// ---------------------------------------------------------------------------

/// Everything a run accumulates. Owned by the caller, moved into
/// `train_loop` and handed back in `RunOutcome` or `RunError`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingState {
    pub history: History,
    pub best: BestModelTracker,
}

impl TrainingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn completed_epochs(&self) -> usize {
        self.history.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every requested epoch ran.
    Completed,
    /// Stopped early by the stop flag or a dropped progress receiver.
    PartialRun { completed_epochs: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub state: TrainingState,
    pub status: RunStatus,
}

/// Result of one pass over a split.
enum Pass<T> {
    Done(T),
    Stopped,
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `classifier` until `state` holds `config.epochs` completed epochs.
///
/// Each epoch runs, strictly in order:
/// 1. an optimization pass over the training split,
/// 2. an evaluation pass over the evaluation split (via `Classifier::predict`,
///    so parameters are not touched),
/// 3. the scheduler step, best-model update, history append and one log line.
///
/// An epoch is committed to the state only after both passes succeed. Any
/// error aborts the run; the returned `RunError` carries the state as of the
/// last completed epoch.
pub fn train_loop<C, O, S>(
    classifier: &mut C,
    optimizer: &mut O,
    source: &mut S,
    config: &TrainConfig,
    mut state: TrainingState,
) -> std::result::Result<RunOutcome, RunError>
where
    C: Classifier + ?Sized,
    O: Optimizer + ?Sized,
    S: BatchSource + ?Sized,
{
    let start = state.completed_epochs();
    optimizer.set_learning_rate(config.scheduler.learning_rate_at(start));

    log::info!(
        "Starting training for {} epochs (lr={})",
        config.epochs.saturating_sub(start),
        optimizer.learning_rate()
    );

    let mut status = RunStatus::Completed;
    for epoch in start..config.epochs {
        if stop_requested(config) {
            status = RunStatus::PartialRun { completed_epochs: state.completed_epochs() };
            break;
        }

        let record = match run_epoch(epoch, classifier, optimizer, source, config, &mut state) {
            Ok(Pass::Done(record)) => record,
            Ok(Pass::Stopped) => {
                status = RunStatus::PartialRun { completed_epochs: state.completed_epochs() };
                break;
            }
            Err(err) => {
                log::error!("Epoch {} failed: {}", epoch + 1, err);
                return Err(RunError { source: err, state });
            }
        };

        if let Some(ref tx) = config.progress_tx {
            // If the receiver has been dropped, stop training.
            if tx.send(record).is_err() {
                status = RunStatus::PartialRun { completed_epochs: state.completed_epochs() };
                break;
            }
        }
    }

    if let RunStatus::PartialRun { completed_epochs } = status {
        log::warn!("Training stopped after {} of {} epochs", completed_epochs, config.epochs);
    }
    log_summary(&state);

    Ok(RunOutcome { state, status })
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn stop_requested(config: &TrainConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .map_or(false, |flag| flag.load(Ordering::Relaxed))
}

/// One full epoch (0-indexed `epoch`). Mutates `state` only at the very end.
fn run_epoch<C, O, S>(
    epoch: usize,
    classifier: &mut C,
    optimizer: &mut O,
    source: &mut S,
    config: &TrainConfig,
    state: &mut TrainingState,
) -> Result<Pass<EpochRecord>>
where
    C: Classifier + ?Sized,
    O: Optimizer + ?Sized,
    S: BatchSource + ?Sized,
{
    let t_start = Instant::now();

    // ── Phase A: optimize ─────────────────────────────────────────────────
    let train = match optimize_pass(epoch, classifier, optimizer, source, config)? {
        Pass::Done(m) => m,
        Pass::Stopped => return Ok(Pass::Stopped),
    };

    // ── Phase B: evaluate ─────────────────────────────────────────────────
    let eval_agg = match evaluate_pass(epoch, &*classifier, source, config)? {
        Pass::Done(agg) => agg,
        Pass::Stopped => return Ok(Pass::Stopped),
    };

    // ── Phase C: schedule, track, record, log ─────────────────────────────
    let eval = eval_agg.finish_eval()?;
    if log::log_enabled!(log::Level::Debug) {
        for c in ConfusionMatrix::from_pairs(eval_agg.pairs()).per_class() {
            log::debug!(
                "  class {}: precision={:.4} recall={:.4} f1={:.4} (tp={} fp={} fn={})",
                c.class, c.precision, c.recall, c.f1,
                c.true_positives, c.false_positives, c.false_negatives
            );
        }
    }
    let learning_rate = config.scheduler.advance(epoch, optimizer);

    let epoch_number = epoch + 1;
    if state.best.consider(epoch_number, &eval) {
        log::debug!("New best model (epoch {}, acc {:.2})", epoch_number, eval.accuracy);
    }
    state.history.push(&train, &eval);

    let best = state.best.best();
    let record = EpochRecord {
        epoch: epoch_number,
        total_epochs: config.epochs,
        train_loss: train.loss,
        test_loss: eval.loss,
        train_accuracy: train.accuracy,
        test_accuracy: eval.accuracy,
        precision: eval.precision,
        recall: eval.recall,
        f1: eval.f1,
        best_epoch: best.epoch,
        best_accuracy: best.accuracy,
        learning_rate,
        elapsed_ms: t_start.elapsed().as_millis() as u64,
    };
    log::info!("{}", record);

    Ok(Pass::Done(record))
}

/// Phase A: one optimizer step per training batch.
fn optimize_pass<C, O, S>(
    epoch: usize,
    classifier: &mut C,
    optimizer: &mut O,
    source: &mut S,
    config: &TrainConfig,
) -> Result<Pass<EpochMetrics>>
where
    C: Classifier + ?Sized,
    O: Optimizer + ?Sized,
    S: BatchSource + ?Sized,
{
    let mut agg = MetricAggregator::for_training();
    source.reset(Split::Train)?;

    loop {
        if stop_requested(config) {
            return Ok(Pass::Stopped);
        }
        let batch = match source.next_batch(Split::Train)? {
            Some(batch) => batch,
            None => break,
        };

        optimizer.zero_grad(&mut classifier.parameters());
        let scores = classifier.forward(batch.inputs())?;
        let (loss, grads) = config.loss.loss_and_grad(&scores, batch.labels())?;
        check_finite(epoch, Split::Train, loss)?;
        classifier.backward(&grads)?;
        optimizer.step(&mut classifier.parameters());

        agg.record_batch(loss, &scores, batch.labels())?;
    }

    Ok(Pass::Done(agg.finish()?))
}

/// Phase B: forward only, collecting (predicted, true) pairs.
fn evaluate_pass<C, S>(
    epoch: usize,
    classifier: &C,
    source: &mut S,
    config: &TrainConfig,
) -> Result<Pass<MetricAggregator>>
where
    C: Classifier + ?Sized,
    S: BatchSource + ?Sized,
{
    let mut agg = MetricAggregator::for_evaluation();
    source.reset(Split::Eval)?;

    loop {
        if stop_requested(config) {
            return Ok(Pass::Stopped);
        }
        let batch = match source.next_batch(Split::Eval)? {
            Some(batch) => batch,
            None => break,
        };

        let scores = classifier.predict(batch.inputs())?;
        let loss = config.loss.loss(&scores, batch.labels())?;
        check_finite(epoch, Split::Eval, loss)?;
        agg.record_batch(loss, &scores, batch.labels())?;
    }

    // Surface an empty split here, before phase C touches anything.
    agg.finish()?;
    Ok(Pass::Done(agg))
}

fn check_finite(epoch: usize, split: Split, loss: f64) -> Result<()> {
    if loss.is_finite() {
        Ok(())
    } else {
        Err(TrainError::NumericInstability { epoch: epoch + 1, split, loss })
    }
}

fn log_summary(state: &TrainingState) {
    let best = state.best.best();
    log::info!(
        "Best epoch={} acc={:.2} precision={:.4} recall={:.4} f1={:.4}",
        best.epoch,
        best.accuracy,
        best.precision,
        best.recall,
        best.f1
    );
}
