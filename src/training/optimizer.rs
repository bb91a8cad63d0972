//! Adam optimizer

use ndarray::{Array, Dimension};
use serde::{Deserialize, Serialize};

/// Adam hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adam {
    /// Step size
    pub learning_rate: f64,
    /// Exponential decay for the first moment
    pub beta1: f64,
    /// Exponential decay for the second moment
    pub beta2: f64,
    /// Numerical stability term
    pub eps: f64,
}

impl Default for Adam {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
        }
    }
}

impl Adam {
    /// Create an optimizer with the given learning rate and default moments
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            ..Default::default()
        }
    }
}

/// Per-tensor Adam state: first and second moment estimates.
///
/// Moments are allocated lazily on the first step and are not persisted;
/// a reloaded model is used for inference or refitted from scratch.
#[derive(Debug, Clone, Default)]
pub struct AdamState<D: Dimension> {
    moments: Option<(Array<f64, D>, Array<f64, D>)>,
}

impl<D: Dimension> AdamState<D> {
    /// Apply one bias-corrected Adam update to `param`.
    ///
    /// `t` is the 1-based global step count shared across all tensors.
    pub fn step(&mut self, param: &mut Array<f64, D>, grad: &Array<f64, D>, opt: &Adam, t: usize) {
        let (m, v) = self.moments.get_or_insert_with(|| {
            (Array::zeros(grad.raw_dim()), Array::zeros(grad.raw_dim()))
        });

        *m = &*m * opt.beta1 + grad * (1.0 - opt.beta1);
        *v = &*v * opt.beta2 + grad.mapv(|g| g * g) * (1.0 - opt.beta2);

        let m_hat = &*m / (1.0 - opt.beta1.powi(t as i32));
        let v_hat = &*v / (1.0 - opt.beta2.powi(t as i32));

        let update = m_hat / (v_hat.mapv(f64::sqrt) + opt.eps) * opt.learning_rate;
        *param -= &update;
    }
}
