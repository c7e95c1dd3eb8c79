//! End-to-end behaviour of `train_loop` against scripted collaborators.

use std::cell::RefCell;
use std::rc::Rc;

use ferrite_train::{
    train_loop, ActivationFunction, Batch, BatchSource, Classifier, Network, Optimizer, Parameter,
    RunStatus, Sgd, Split, StepLr, TrainConfig, TrainError, TrainingState,
};

type Log = Rc<RefCell<Vec<String>>>;

/// Predicts `scripted[epoch][i]` for the i-th evaluation sample and always
/// class 0 during training. Logs every call.
struct ScriptedClassifier {
    log: Log,
    param: Parameter,
    eval_predictions: Vec<Vec<usize>>,
    epoch: RefCell<usize>,
    eval_cursor: RefCell<usize>,
}

impl ScriptedClassifier {
    fn new(log: Log, eval_predictions: Vec<Vec<usize>>) -> Self {
        ScriptedClassifier {
            log,
            param: Parameter::new(vec![0.0]),
            eval_predictions,
            epoch: RefCell::new(0),
            eval_cursor: RefCell::new(0),
        }
    }
}

fn one_hot(class: usize) -> Vec<f64> {
    let mut v = vec![0.0; 2];
    v[class] = 5.0;
    v
}

impl Classifier for ScriptedClassifier {
    fn input_size(&self) -> usize {
        1
    }

    fn num_classes(&self) -> usize {
        2
    }

    fn forward(&mut self, inputs: &[Vec<f64>]) -> ferrite_train::Result<Vec<Vec<f64>>> {
        self.log.borrow_mut().push("forward".into());
        *self.eval_cursor.borrow_mut() = 0;
        Ok(inputs.iter().map(|_| one_hot(0)).collect())
    }

    fn predict(&self, inputs: &[Vec<f64>]) -> ferrite_train::Result<Vec<Vec<f64>>> {
        self.log.borrow_mut().push("predict".into());
        let epoch = *self.epoch.borrow();
        let mut cursor = self.eval_cursor.borrow_mut();
        let out = inputs
            .iter()
            .map(|_| {
                let p = self.eval_predictions[epoch][*cursor];
                *cursor += 1;
                one_hot(p)
            })
            .collect();
        if *cursor == self.eval_predictions[epoch].len() {
            *self.epoch.borrow_mut() += 1;
        }
        Ok(out)
    }

    fn backward(&mut self, _score_grads: &[Vec<f64>]) -> ferrite_train::Result<()> {
        self.log.borrow_mut().push("backward".into());
        self.param.grads[0] += 1.0;
        Ok(())
    }

    fn parameters(&mut self) -> Vec<&mut Parameter> {
        vec![&mut self.param]
    }
}

struct RecordingOptimizer {
    log: Log,
    lr: f64,
    steps: usize,
}

impl Optimizer for RecordingOptimizer {
    fn step(&mut self, params: &mut [&mut Parameter]) {
        self.log.borrow_mut().push("step".into());
        assert_eq!(params[0].grads[0], 1.0, "zero_grad must run before each backward");
        self.steps += 1;
    }

    fn zero_grad(&mut self, params: &mut [&mut Parameter]) {
        self.log.borrow_mut().push("zero_grad".into());
        for p in params.iter_mut() {
            p.zero_grad();
        }
    }

    fn learning_rate(&self) -> f64 {
        self.lr
    }

    fn set_learning_rate(&mut self, lr: f64) {
        self.log.borrow_mut().push(format!("lr={}", lr));
        self.lr = lr;
    }
}

/// Two training batches of one sample, eval split from `eval_labels` in
/// batches of two.
struct FixedSource {
    log: Log,
    eval_labels: Vec<usize>,
    cursor: usize,
}

impl BatchSource for FixedSource {
    fn reset(&mut self, split: Split) -> ferrite_train::Result<()> {
        self.log.borrow_mut().push(format!("reset {}", split));
        self.cursor = 0;
        Ok(())
    }

    fn next_batch(&mut self, split: Split) -> ferrite_train::Result<Option<Batch>> {
        match split {
            Split::Train if self.cursor < 2 => {
                self.cursor += 1;
                Batch::new(vec![vec![0.0]], vec![self.cursor % 2]).map(Some)
            }
            Split::Eval if self.cursor < self.eval_labels.len() => {
                let end = (self.cursor + 2).min(self.eval_labels.len());
                let labels = self.eval_labels[self.cursor..end].to_vec();
                self.cursor = end;
                Batch::new(vec![vec![0.0]; labels.len()], labels).map(Some)
            }
            _ => Ok(None),
        }
    }
}

fn run(
    eval_labels: Vec<usize>,
    predictions: Vec<Vec<usize>>,
    epochs: usize,
) -> (Result<ferrite_train::RunOutcome, ferrite_train::RunError>, Vec<String>, usize) {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut classifier = ScriptedClassifier::new(log.clone(), predictions);
    let mut optimizer = RecordingOptimizer { log: log.clone(), lr: 0.0, steps: 0 };
    let mut source = FixedSource { log: log.clone(), eval_labels, cursor: 0 };
    let config = TrainConfig::new(epochs, StepLr::new(0.1, 5, 0.5));
    let result = train_loop(&mut classifier, &mut optimizer, &mut source, &config, TrainingState::new());
    let events = log.borrow().clone();
    (result, events, optimizer.steps)
}

#[test]
fn phases_run_in_order_each_epoch() {
    let (result, events, steps) = run(vec![0, 1], vec![vec![0, 1], vec![0, 0]], 2);
    assert!(result.is_ok());
    assert_eq!(steps, 4);

    let epoch_events = [
        "reset train", "zero_grad", "forward", "backward", "step", "zero_grad", "forward",
        "backward", "step", "reset eval", "predict",
    ];
    let mut expected: Vec<String> = vec!["lr=0.1".into()];
    for _ in 0..2 {
        expected.extend(epoch_events.iter().map(|s| s.to_string()));
        expected.push("lr=0.1".into());
    }
    assert_eq!(events, expected);
}

#[test]
fn eval_metrics_and_best_record_follow_predictions() {
    // Epoch 1: 2/4 correct, epoch 2: 3/4, epoch 3: 3/4 (tie), epoch 4: 1/4.
    let labels = vec![0, 0, 1, 1];
    let preds = vec![
        vec![0, 1, 0, 1],
        vec![0, 1, 1, 1],
        vec![0, 0, 0, 1],
        vec![1, 1, 0, 1],
    ];
    let (result, _, _) = run(labels, preds, 4);
    let state = result.unwrap().state;

    assert_eq!(state.history.test_accuracy(), &[50.0, 75.0, 75.0, 25.0]);
    // Training always predicts class 0 over labels [1, 0].
    assert_eq!(state.history.train_accuracy(), &[50.0; 4]);

    let best = state.best.best();
    assert_eq!(best.epoch, 2);
    assert_eq!(best.accuracy, 75.0);
    // true=[0,0,1,1], pred=[0,1,1,1]
    assert!((best.recall - 0.75).abs() < 1e-12);
    assert!((best.precision - (1.0 + 2.0 / 3.0) / 2.0).abs() < 1e-12);
}

#[test]
fn empty_eval_split_is_invalid_input_and_records_nothing() {
    let (result, events, _) = run(vec![], vec![vec![]], 3);
    let err = result.unwrap_err();
    assert!(matches!(err.source, TrainError::InvalidInput(_)));
    assert_eq!(err.state, TrainingState::new());
    // Aborted during the first epoch: no scheduler step after the initial one.
    assert_eq!(events.iter().filter(|e| e.starts_with("lr=")).count(), 1);
}

#[test]
fn completed_status_after_all_epochs() {
    let (result, _, _) = run(vec![0], vec![vec![0]; 3], 3);
    let outcome = result.unwrap();
    assert_eq!(outcome.status, RunStatus::Completed);
    assert_eq!(outcome.state.completed_epochs(), 3);
}

/// One batch per split per epoch until the split runs dry from a given
/// 1-based epoch on. Both samples share an input, so any classifier scores
/// exactly 50%.
struct DryingSource {
    train_empty_from: Option<usize>,
    eval_empty_from: Option<usize>,
    epoch: usize,
    served: bool,
}

impl DryingSource {
    fn new(train_empty_from: Option<usize>, eval_empty_from: Option<usize>) -> Self {
        DryingSource { train_empty_from, eval_empty_from, epoch: 0, served: false }
    }
}

impl BatchSource for DryingSource {
    fn reset(&mut self, split: Split) -> ferrite_train::Result<()> {
        if split == Split::Train {
            self.epoch += 1;
        }
        self.served = false;
        Ok(())
    }

    fn next_batch(&mut self, split: Split) -> ferrite_train::Result<Option<Batch>> {
        let empty_from = match split {
            Split::Train => self.train_empty_from,
            Split::Eval => self.eval_empty_from,
        };
        if self.served || empty_from.map_or(false, |e| self.epoch >= e) {
            return Ok(None);
        }
        self.served = true;
        Batch::new(vec![vec![0.0], vec![0.0]], vec![0, 1]).map(Some)
    }
}

fn run_drying(source: &mut DryingSource) -> ferrite_train::RunError {
    let mut net = Network::mlp(1, &[4], 2, ActivationFunction::ReLU, 3);
    let mut opt = Sgd::new(0.1);
    let config = TrainConfig::new(4, StepLr::new(0.1, 2, 0.5));
    train_loop(&mut net, &mut opt, source, &config, TrainingState::new()).unwrap_err()
}

#[test]
fn empty_training_split_in_first_epoch_records_nothing() {
    let err = run_drying(&mut DryingSource::new(Some(1), None));
    assert!(matches!(err.source, TrainError::InvalidInput(_)));
    assert_eq!(err.state, TrainingState::new());
}

#[test]
fn empty_training_split_later_keeps_completed_epochs() {
    let err = run_drying(&mut DryingSource::new(Some(3), None));
    assert!(matches!(err.source, TrainError::InvalidInput(_)));
    assert_eq!(err.state.completed_epochs(), 2);
    assert_eq!(err.state.history.test_accuracy(), &[50.0, 50.0]);
    assert_eq!(err.state.best.best().epoch, 1);
}

#[test]
fn empty_eval_split_after_first_epoch_keeps_first_epoch() {
    let err = run_drying(&mut DryingSource::new(None, Some(2)));
    assert!(matches!(err.source, TrainError::InvalidInput(_)));
    assert_eq!(err.state.completed_epochs(), 1);
    assert_eq!(err.state.history.train_loss().len(), 1);
    assert_eq!(err.state.best.best().epoch, 1);
    assert_eq!(err.state.best.best().accuracy, 50.0);
}
