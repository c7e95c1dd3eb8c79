//! Stochastic gradient descent with optional momentum and weight decay

use super::Optimizer;
use crate::layers::dense::Parameter;

#[derive(Debug, Clone)]
pub struct Sgd {
    pub learning_rate: f64,
    pub momentum: f64,
    pub weight_decay: f64,
    velocities: Vec<Vec<f64>>,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd::with_momentum(learning_rate, 0.0, 0.0)
    }

    pub fn with_momentum(learning_rate: f64, momentum: f64, weight_decay: f64) -> Sgd {
        Sgd {
            learning_rate,
            momentum,
            weight_decay,
            velocities: Vec::new(),
        }
    }
}

impl Optimizer for Sgd {
    /// `v = μ·v + (g + λ·w)`, `w -= lr·v`; with μ = 0 this is plain SGD.
    fn step(&mut self, params: &mut [&mut Parameter]) {
        if self.velocities.len() != params.len() {
            self.velocities = params.iter().map(|p| vec![0.0; p.len()]).collect();
        }

        for (param, velocity) in params.iter_mut().zip(self.velocities.iter_mut()) {
            let Parameter { values, grads } = &mut **param;
            for ((w, g), v) in values.iter_mut().zip(grads.iter()).zip(velocity.iter_mut()) {
                let g = g + self.weight_decay * *w;
                *v = self.momentum * *v + g;
                *w -= self.learning_rate * *v;
            }
        }
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f64) {
        self.learning_rate = lr;
    }
}
