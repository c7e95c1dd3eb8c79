//! Wires a `Config` into a full training run: data, model, optimizer, loop,
//! and curve reports.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::{Config, DataConfig, OptimizerKind};
use crate::data::idx::load_idx_pair;
use crate::data::image_folder::load_image_folder;
use crate::data::in_memory::{Dataset, InMemorySource};
use crate::data::synthetic::gaussian_blobs;
use crate::error::{Result, RunError, TrainError};
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::network::network::Network;
use crate::optim::{Adam, Optimizer, Sgd};
use crate::report::{render_history, CurveReporter, JsonCurveReporter, PngCurveReporter};
use crate::train::history::History;
use crate::train::loop_fn::{train_loop, RunOutcome, TrainingState};
use crate::train::train_config::TrainConfig;

/// Loads the train and test splits described by `data`.
pub fn load_datasets(data: &DataConfig, seed: u64) -> Result<(Dataset, Dataset)> {
    match data {
        DataConfig::Idx { train_images, train_labels, test_images, test_labels } => Ok((
            load_idx_pair(train_images, train_labels)?,
            load_idx_pair(test_images, test_labels)?,
        )),
        DataConfig::ImageFolder { train_dir, test_dir, width, height } => {
            let (train, train_classes) = load_image_folder(train_dir, *width, *height)?;
            let (test, test_classes) = load_image_folder(test_dir, *width, *height)?;
            if train_classes != test_classes {
                return Err(TrainError::InvalidInput(format!(
                    "train classes {:?} differ from test classes {:?}",
                    train_classes, test_classes
                )));
            }
            Ok((train, test))
        }
        DataConfig::Synthetic { classes, samples_per_class, features, spread, test_fraction } => {
            let all = gaussian_blobs(*classes, *samples_per_class, *features, *spread, seed);
            Ok(all.split_off(*test_fraction, seed))
        }
    }
}

pub fn build_optimizer(config: &Config) -> Box<dyn Optimizer> {
    let o = &config.optimizer;
    match o.kind {
        OptimizerKind::Sgd => Box::new(Sgd::with_momentum(o.learning_rate, o.momentum, o.weight_decay)),
        OptimizerKind::Adam => Box::new(Adam::new(o.learning_rate, 0.9, 0.999, 1e-8, o.weight_decay)),
    }
}

/// Returns a stop flag that a background thread raises once `limit` has
/// elapsed. The loop finishes its current batch and ends as a partial run.
pub fn stop_after(limit: Duration) -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let raised = Arc::clone(&flag);
    thread::spawn(move || {
        thread::sleep(limit);
        log::info!("Time limit of {:?} reached, stopping", limit);
        raised.store(true, Ordering::Relaxed);
    });
    flag
}

/// Runs one training session end to end.
///
/// Setup failures (bad data, empty datasets) are returned as a `RunError`
/// with an empty state. Curve rendering happens for completed, partial and
/// aborted runs alike and never changes the result.
pub fn run(config: &Config, stop_flag: Option<Arc<AtomicBool>>) -> std::result::Result<RunOutcome, RunError> {
    let setup = || -> Result<(InMemorySource, Network)> {
        let (train, test) = load_datasets(&config.data, config.training.seed)?;
        if train.is_empty() || test.is_empty() {
            return Err(TrainError::InvalidInput(format!(
                "empty split: {} training and {} test samples",
                train.len(),
                test.len()
            )));
        }
        let num_classes = train.num_classes().max(test.num_classes());
        let network = Network::mlp(
            train.input_size(),
            &config.model.hidden,
            num_classes,
            config.model.activation,
            config.training.seed,
        );
        log::info!(
            "Dataset: {} train / {} test samples, {} features, {} classes; model has {} parameters",
            train.len(),
            test.len(),
            train.input_size(),
            num_classes,
            network.parameter_count()
        );
        let source = InMemorySource::new(train, test, config.training.batch_size, config.training.seed)?;
        Ok((source, network))
    };

    let (mut source, mut network) = setup().map_err(|source| RunError {
        source,
        state: TrainingState::new(),
    })?;

    let mut optimizer = build_optimizer(config);
    let mut train_config = TrainConfig::new(config.training.epochs, config.scheduler());
    train_config.loss = CrossEntropyLoss::new(config.training.label_smoothing);
    train_config.stop_flag = stop_flag;

    let result = train_loop(
        &mut network,
        optimizer.as_mut(),
        &mut source,
        &train_config,
        TrainingState::new(),
    );

    let history = match &result {
        Ok(outcome) => &outcome.state.history,
        Err(err) => &err.state.history,
    };
    report_curves(config, history);

    result
}

/// Fire-and-forget: failures are logged, never returned.
pub fn report_curves(config: &Config, history: &History) {
    let mut reporters: Vec<Box<dyn CurveReporter>> = Vec::new();
    if let Some(path) = &config.output.curves_png {
        reporters.push(Box::new(PngCurveReporter::new(path)));
    }
    if let Some(path) = &config.output.curves_json {
        reporters.push(Box::new(JsonCurveReporter::new(path)));
    }
    for reporter in reporters.iter_mut() {
        if let Err(e) = render_history(reporter.as_mut(), history) {
            log::warn!("Could not render learning curves: {}", e);
        }
    }
}
