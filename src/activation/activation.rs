use serde::{Serialize, Deserialize};
use std::f64::consts::E;

/// Slope used by `LeakyReLU` for negative inputs.
const LEAKY_SLOPE: f64 = 0.01;

/// Element-wise activation for hidden layers.
///
/// The output layer of a classifier is always `Identity`: the loss works on
/// raw class scores and applies the softmax itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    Identity,
    #[serde(rename = "relu")]
    ReLU,
    #[serde(rename = "leaky_relu")]
    LeakyReLU,
    Sigmoid,
    Tanh,
}

impl ActivationFunction {
    /// NaN passes through every variant so a diverged layer surfaces as a
    /// non-finite loss instead of being clamped away.
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Identity => x,
            ActivationFunction::ReLU => if x > 0.0 || x.is_nan() { x } else { 0.0 },
            ActivationFunction::LeakyReLU => if x > 0.0 || x.is_nan() { x } else { LEAKY_SLOPE * x },
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::Tanh => x.tanh(),
        }
    }

    /// Derivative evaluated at the pre-activation `x`.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Identity => 1.0,
            ActivationFunction::ReLU | ActivationFunction::LeakyReLU if x.is_nan() => x,
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::LeakyReLU => if x > 0.0 { 1.0 } else { LEAKY_SLOPE },
            ActivationFunction::Sigmoid => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            }
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
        }
    }

    /// ReLU-family layers get He init, the rest Xavier.
    pub fn prefers_he_init(&self) -> bool {
        matches!(self, ActivationFunction::ReLU | ActivationFunction::LeakyReLU)
    }
}
