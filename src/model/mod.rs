//! Model lifecycle: train, predict, persist, reload

mod neural;

pub use neural::{NeuralModel, DEFAULT_MODEL_DIR};

use crate::error::Result;
use ndarray::{Array1, Array2};

/// Common lifecycle of a trainable model keyed by a run/fold identifier.
///
/// The state machine is: untrained, then trained-or-loaded, then usable for
/// `predict` and `save`.
pub trait Model {
    /// Fit on training data, optionally early-stopping against a validation set
    fn train(
        &mut self,
        tr_x: &Array2<f64>,
        tr_y: &Array1<f64>,
        va_x: Option<&Array2<f64>>,
        va_y: Option<&Array1<f64>>,
    ) -> Result<()>;

    /// Per-class probability estimates for new data
    fn predict(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    /// Persist the trained artifacts
    fn save(&self) -> Result<()>;

    /// Repopulate the model from persisted artifacts
    fn load(&mut self) -> Result<()>;

    /// Identifier naming this run/fold's artifacts
    fn run_fold_name(&self) -> &str;
}
