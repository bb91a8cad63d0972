//! Feed-forward softmax classifier
//!
//! Hidden blocks of Dense, PReLU, BatchNorm, and Dropout, a softmax output
//! head, mini-batch cross-entropy training with Adam, and optional
//! validation-loss early stopping with best-weight restore.

use crate::architectures::{softmax_rows, BatchNorm1d, Dense, Dropout, PReLU};
use crate::error::{Result, TabMlpError};
use crate::training::{Adam, EarlyStopping, NetworkConfig};
use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One hidden block of the network
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HiddenBlock {
    dense: Dense,
    prelu: PReLU,
    norm: BatchNorm1d,
    dropout: Dropout,
}

impl HiddenBlock {
    fn new(n_in: usize, n_out: usize, dropout: f64, rng: &mut Xoshiro256PlusPlus) -> Self {
        Self {
            dense: Dense::new(n_in, n_out, rng),
            prelu: PReLU::new(n_out),
            norm: BatchNorm1d::new(n_out),
            dropout: Dropout::new(dropout),
        }
    }

    fn forward_train(&mut self, x: &Array2<f64>, rng: &mut Xoshiro256PlusPlus) -> Array2<f64> {
        let z = self.dense.forward_train(x);
        let z = self.prelu.forward_train(&z);
        let z = self.norm.forward_train(&z);
        self.dropout.forward_train(&z, rng)
    }

    fn forward_eval(&self, x: &Array2<f64>) -> Array2<f64> {
        let z = self.dense.forward_eval(x);
        let z = self.prelu.forward_eval(&z);
        let z = self.norm.forward_eval(&z);
        self.dropout.forward_eval(&z)
    }

    fn backward(&mut self, delta: &Array2<f64>) -> Result<Array2<f64>> {
        let delta = self.dropout.backward(delta)?;
        let delta = self.norm.backward(&delta)?;
        let delta = self.prelu.backward(&delta)?;
        self.dense.backward(&delta)
    }

    fn update(&mut self, opt: &Adam, t: usize) {
        self.dense.update(opt, t);
        self.prelu.update(opt, t);
        self.norm.update(opt, t);
    }
}

/// Snapshot of the trainable state, used to restore the best validation epoch
#[derive(Debug, Clone)]
struct NetworkState {
    blocks: Vec<HiddenBlock>,
    output: Dense,
}

/// Per-epoch record of a completed training run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingHistory {
    /// Mean cross-entropy on the training set per epoch
    pub train_loss: Vec<f64>,
    /// Cross-entropy on the validation set per epoch, when one was supplied
    pub val_loss: Vec<f64>,
    /// Number of epochs actually run
    pub epochs_run: usize,
    /// Whether early stopping halted training before `max_epochs`
    pub stopped_early: bool,
    /// Completion timestamp
    pub trained_at: Option<DateTime<Utc>>,
}

/// Multi-layer perceptron classifier with a softmax output head
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpClassifier {
    config: NetworkConfig,
    blocks: Vec<HiddenBlock>,
    output: Dense,
    n_features: usize,
    is_fitted: bool,
    history: TrainingHistory,
}

impl MlpClassifier {
    pub fn new(config: NetworkConfig) -> Self {
        // The output head is rebuilt in fit once the input width is known
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        Self {
            output: Dense::new(1, config.n_classes, &mut rng),
            config,
            blocks: Vec::new(),
            n_features: 0,
            is_fitted: false,
            history: TrainingHistory::default(),
        }
    }

    /// Fit the network on one-hot encoded labels.
    ///
    /// With validation data, training stops once the validation loss fails to
    /// improve for more than `patience` consecutive epochs and the best-seen
    /// weights are restored; without it, exactly `max_epochs` epochs run.
    pub fn fit(
        &mut self,
        x: &Array2<f64>,
        y: &Array2<f64>,
        validation: Option<(&Array2<f64>, &Array2<f64>)>,
    ) -> Result<()> {
        self.config.validate()?;
        self.check_training_shapes(x, y, validation)?;

        let n_samples = x.nrows();
        self.n_features = x.ncols();

        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };
        self.build_layers(&mut rng);

        let opt = Adam::new(self.config.learning_rate);
        let mut step = 0usize;
        let mut stopper: Option<EarlyStopping<NetworkState>> =
            validation.map(|_| EarlyStopping::new(self.config.patience));
        let mut history = TrainingHistory::default();

        for epoch in 0..self.config.max_epochs {
            let mut indices: Vec<usize> = (0..n_samples).collect();
            indices.shuffle(&mut rng);

            let mut epoch_loss = 0.0;
            for batch_start in (0..n_samples).step_by(self.config.batch_size) {
                let batch_end = (batch_start + self.config.batch_size).min(n_samples);
                let batch_indices = &indices[batch_start..batch_end];

                let x_batch = gather_rows(x, batch_indices);
                let y_batch = gather_rows(y, batch_indices);

                let probs = self.forward_train(&x_batch, &mut rng);
                epoch_loss += cross_entropy(&y_batch, &probs) * batch_indices.len() as f64;

                // Cross-entropy gradient with softmax
                let delta = (&probs - &y_batch) / batch_indices.len() as f64;
                self.backward(&delta)?;

                step += 1;
                self.update(&opt, step);
            }

            let train_loss = epoch_loss / n_samples as f64;
            history.train_loss.push(train_loss);
            history.epochs_run = epoch + 1;

            if let (Some(stopper), Some((va_x, va_y))) = (stopper.as_mut(), validation) {
                let val_probs = self.forward_eval(va_x);
                let val_loss = cross_entropy(va_y, &val_probs);
                history.val_loss.push(val_loss);
                debug!(epoch, train_loss, val_loss, "epoch complete");

                let state = NetworkState {
                    blocks: self.blocks.clone(),
                    output: self.output.clone(),
                };
                if stopper.observe(epoch, val_loss, &state) {
                    history.stopped_early = true;
                    break;
                }
            } else {
                debug!(epoch, train_loss, "epoch complete");
            }
        }

        if let Some(stopper) = stopper {
            if let Some(best) = stopper.into_best() {
                self.blocks = best.blocks;
                self.output = best.output;
            }
        }

        history.trained_at = Some(Utc::now());
        self.history = history;
        self.is_fitted = true;
        Ok(())
    }

    /// Per-class probability estimates, one row per example
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(TabMlpError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(TabMlpError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(self.forward_eval(x))
    }

    /// Most probable class per example
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let probs = self.predict_proba(x)?;
        Ok(probs
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(i, _)| i)
                    .unwrap_or(0)
            })
            .collect())
    }

    /// Record of the last completed fit
    pub fn history(&self) -> &TrainingHistory {
        &self.history
    }

    /// Configuration the classifier was built with
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Number of input features; 0 until fitted
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    fn build_layers(&mut self, rng: &mut Xoshiro256PlusPlus) {
        let mut blocks = Vec::with_capacity(self.config.layers);
        blocks.push(HiddenBlock::new(
            self.n_features,
            self.config.units,
            self.config.dropout,
            rng,
        ));
        for _ in 1..self.config.layers {
            blocks.push(HiddenBlock::new(
                self.config.units,
                self.config.units,
                self.config.dropout,
                rng,
            ));
        }

        self.blocks = blocks;
        self.output = Dense::new(self.config.units, self.config.n_classes, rng);
    }

    fn forward_train(&mut self, x: &Array2<f64>, rng: &mut Xoshiro256PlusPlus) -> Array2<f64> {
        let mut h = x.clone();
        for block in &mut self.blocks {
            h = block.forward_train(&h, rng);
        }
        let logits = self.output.forward_train(&h);
        softmax_rows(&logits)
    }

    fn forward_eval(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut h = x.clone();
        for block in &self.blocks {
            h = block.forward_eval(&h);
        }
        let logits = self.output.forward_eval(&h);
        softmax_rows(&logits)
    }

    fn backward(&mut self, delta: &Array2<f64>) -> Result<()> {
        let mut delta = self.output.backward(delta)?;
        for block in self.blocks.iter_mut().rev() {
            delta = block.backward(&delta)?;
        }
        Ok(())
    }

    fn update(&mut self, opt: &Adam, t: usize) {
        self.output.update(opt, t);
        for block in &mut self.blocks {
            block.update(opt, t);
        }
    }

    fn check_training_shapes(
        &self,
        x: &Array2<f64>,
        y: &Array2<f64>,
        validation: Option<(&Array2<f64>, &Array2<f64>)>,
    ) -> Result<()> {
        if x.nrows() == 0 {
            return Err(TabMlpError::DataError("empty training set".to_string()));
        }
        if y.nrows() != x.nrows() {
            return Err(TabMlpError::ShapeError {
                expected: format!("{} label rows", x.nrows()),
                actual: format!("{} label rows", y.nrows()),
            });
        }
        if y.ncols() != self.config.n_classes {
            return Err(TabMlpError::ShapeError {
                expected: format!("{} classes", self.config.n_classes),
                actual: format!("{} classes", y.ncols()),
            });
        }

        if let Some((va_x, va_y)) = validation {
            if va_x.ncols() != x.ncols() {
                return Err(TabMlpError::ShapeError {
                    expected: format!("{} features", x.ncols()),
                    actual: format!("{} features", va_x.ncols()),
                });
            }
            if va_y.nrows() != va_x.nrows() || va_y.ncols() != self.config.n_classes {
                return Err(TabMlpError::ShapeError {
                    expected: format!("{} x {}", va_x.nrows(), self.config.n_classes),
                    actual: format!("{} x {}", va_y.nrows(), va_y.ncols()),
                });
            }
        }
        Ok(())
    }
}

/// Mean cross-entropy between one-hot targets and predicted probabilities
pub fn cross_entropy(y_true: &Array2<f64>, probs: &Array2<f64>) -> f64 {
    let n = y_true.nrows() as f64;
    let mut loss = 0.0;
    for (t, p) in y_true.iter().zip(probs.iter()) {
        if *t > 0.0 {
            loss -= t * (p + 1e-12).ln();
        }
    }
    loss / n
}

fn gather_rows(x: &Array2<f64>, indices: &[usize]) -> Array2<f64> {
    let n_cols = x.ncols();
    let mut rows = Vec::with_capacity(indices.len() * n_cols);
    for &i in indices {
        rows.extend(x.row(i).iter().copied());
    }
    Array2::from_shape_vec((indices.len(), n_cols), rows).unwrap()
}
