//! Run configuration loaded from a TOML file

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{Result, TrainError};
use crate::optim::scheduler::StepLr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub training: TrainingConfig,
    pub optimizer: OptimizerConfig,
    pub scheduler: SchedulerConfig,
    pub model: ModelConfig,
    pub data: DataConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub seed: u64,
    #[serde(default)]
    pub label_smoothing: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    Sgd,
    Adam,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub kind: OptimizerKind,
    pub learning_rate: f64,
    /// SGD only.
    #[serde(default)]
    pub momentum: f64,
    #[serde(default)]
    pub weight_decay: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub step_size: usize,
    pub gamma: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub hidden: Vec<usize>,
    pub activation: ActivationFunction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataConfig {
    /// MNIST-style IDX files.
    Idx {
        train_images: PathBuf,
        train_labels: PathBuf,
        test_images: PathBuf,
        test_labels: PathBuf,
    },
    /// One sub-directory per class under each root.
    ImageFolder {
        train_dir: PathBuf,
        test_dir: PathBuf,
        width: u32,
        height: u32,
    },
    /// Generated Gaussian blobs, split into train/test by `test_fraction`.
    Synthetic {
        classes: usize,
        samples_per_class: usize,
        features: usize,
        spread: f64,
        test_fraction: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub curves_png: Option<PathBuf>,
    #[serde(default)]
    pub curves_json: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            training: TrainingConfig {
                epochs: 20,
                batch_size: 32,
                seed: 42,
                label_smoothing: 0.0,
            },
            optimizer: OptimizerConfig {
                kind: OptimizerKind::Sgd,
                learning_rate: 0.1,
                momentum: 0.9,
                weight_decay: 0.0,
            },
            scheduler: SchedulerConfig {
                step_size: 5,
                gamma: 0.5,
            },
            model: ModelConfig {
                hidden: vec![64, 32],
                activation: ActivationFunction::ReLU,
            },
            data: DataConfig::Synthetic {
                classes: 4,
                samples_per_class: 250,
                features: 16,
                spread: 0.35,
                test_fraction: 0.2,
            },
            output: OutputConfig {
                curves_png: Some(PathBuf::from("curves.png")),
                curves_json: Some(PathBuf::from("curves.json")),
            },
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TrainError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| TrainError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| TrainError::Config(format!("Failed to serialize config: {}", e)))
    }

    pub fn scheduler(&self) -> StepLr {
        StepLr::new(self.optimizer.learning_rate, self.scheduler.step_size, self.scheduler.gamma)
    }

    /// Rejects values that would make a run meaningless or ill-defined.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(TrainError::Config(msg.to_owned()));

        if self.training.epochs == 0 {
            return fail("training.epochs must be at least 1");
        }
        if self.training.batch_size == 0 {
            return fail("training.batch_size must be at least 1");
        }
        if !(0.0..1.0).contains(&self.training.label_smoothing) {
            return fail("training.label_smoothing must be in [0, 1)");
        }
        let lr = self.optimizer.learning_rate;
        if !lr.is_finite() || lr <= 0.0 {
            return fail("optimizer.learning_rate must be positive and finite");
        }
        if !(0.0..1.0).contains(&self.optimizer.momentum) {
            return fail("optimizer.momentum must be in [0, 1)");
        }
        if !self.optimizer.weight_decay.is_finite() || self.optimizer.weight_decay < 0.0 {
            return fail("optimizer.weight_decay must be non-negative");
        }
        if self.scheduler.step_size == 0 {
            return fail("scheduler.step_size must be at least 1");
        }
        if !(self.scheduler.gamma > 0.0 && self.scheduler.gamma <= 1.0) {
            return fail("scheduler.gamma must be in (0, 1]");
        }
        if self.model.hidden.iter().any(|&h| h == 0) {
            return fail("model.hidden sizes must be at least 1");
        }
        match &self.data {
            DataConfig::ImageFolder { width, height, .. } if *width == 0 || *height == 0 => {
                fail("data.width and data.height must be at least 1")
            }
            DataConfig::Synthetic { classes, samples_per_class, features, test_fraction, .. } => {
                if *classes < 2 || *samples_per_class == 0 || *features == 0 {
                    fail("synthetic data needs classes >= 2, samples_per_class >= 1, features >= 1")
                } else if !(*test_fraction > 0.0 && *test_fraction < 1.0) {
                    fail("data.test_fraction must be in (0, 1)")
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }
}
