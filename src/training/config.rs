//! Network configuration and hyperparameter parsing

use crate::error::{Result, TabMlpError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Hyperparameters for [`MlpClassifier`](super::MlpClassifier).
///
/// When built from a raw hyperparameter record via [`NetworkConfig::from_params`],
/// `layers`, `units`, `dropout`, `max_epochs`, and `patience` are required;
/// the remaining fields fall back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Number of hidden blocks
    pub layers: usize,
    /// Width of each hidden block
    pub units: usize,
    /// Dropout rate applied after each hidden block
    pub dropout: f64,
    /// Maximum number of training epochs
    pub max_epochs: usize,
    /// Non-improving validation epochs tolerated before stopping
    pub patience: usize,
    /// Mini-batch size
    pub batch_size: usize,
    /// Size of the label space
    pub n_classes: usize,
    /// Adam step size
    pub learning_rate: f64,
    /// Random seed
    pub random_state: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            layers: 2,
            units: 128,
            dropout: 0.2,
            max_epochs: 100,
            patience: 10,
            batch_size: 128,
            n_classes: 9,
            learning_rate: 0.001,
            random_state: Some(42),
        }
    }
}

impl NetworkConfig {
    /// Build a configuration from a hyperparameter record.
    ///
    /// Fails with [`TabMlpError::MissingParameter`] when a required key is
    /// absent and [`TabMlpError::InvalidParameter`] when a value has the wrong
    /// type or an out-of-range setting.
    pub fn from_params(params: &Map<String, Value>) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            layers: require_usize(params, "layers")?,
            units: require_usize(params, "units")?,
            dropout: require_f64(params, "dropout")?,
            max_epochs: require_usize(params, "max_epochs")?,
            patience: require_usize(params, "patience")?,
            batch_size: optional_usize(params, "batch_size", defaults.batch_size)?,
            n_classes: optional_usize(params, "n_classes", defaults.n_classes)?,
            learning_rate: optional_f64(params, "learning_rate", defaults.learning_rate)?,
            random_state: defaults.random_state,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check that every setting is inside its valid range
    pub fn validate(&self) -> Result<()> {
        if self.layers == 0 {
            return Err(invalid("layers", self.layers, "must be at least 1"));
        }
        if self.units == 0 {
            return Err(invalid("units", self.units, "must be at least 1"));
        }
        if self.n_classes < 2 {
            return Err(invalid("n_classes", self.n_classes, "must be at least 2"));
        }
        if self.batch_size == 0 {
            return Err(invalid("batch_size", self.batch_size, "must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(invalid("dropout", self.dropout, "must be in [0, 1)"));
        }
        if self.learning_rate <= 0.0 {
            return Err(invalid("learning_rate", self.learning_rate, "must be positive"));
        }
        Ok(())
    }
}

fn invalid(name: &str, value: impl std::fmt::Display, reason: &str) -> TabMlpError {
    TabMlpError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn require_value<'a>(params: &'a Map<String, Value>, key: &str) -> Result<&'a Value> {
    params
        .get(key)
        .ok_or_else(|| TabMlpError::MissingParameter(key.to_string()))
}

fn require_usize(params: &Map<String, Value>, key: &str) -> Result<usize> {
    let value = require_value(params, key)?;
    value
        .as_u64()
        .map(|v| v as usize)
        .ok_or_else(|| invalid(key, value, "expected a non-negative integer"))
}

fn require_f64(params: &Map<String, Value>, key: &str) -> Result<f64> {
    let value = require_value(params, key)?;
    value
        .as_f64()
        .ok_or_else(|| invalid(key, value, "expected a number"))
}

fn optional_usize(params: &Map<String, Value>, key: &str, default: usize) -> Result<usize> {
    match params.get(key) {
        Some(value) => value
            .as_u64()
            .map(|v| v as usize)
            .ok_or_else(|| invalid(key, value, "expected a non-negative integer")),
        None => Ok(default),
    }
}

fn optional_f64(params: &Map<String, Value>, key: &str, default: f64) -> Result<f64> {
    match params.get(key) {
        Some(value) => value
            .as_f64()
            .ok_or_else(|| invalid(key, value, "expected a number")),
        None => Ok(default),
    }
}
