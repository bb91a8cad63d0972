//! Network training
//!
//! Provides the feed-forward classifier and its training machinery:
//! - [`NetworkConfig`] - hyperparameter record with required/optional keys
//! - [`MlpClassifier`] - the estimator (fit / predict_proba / predict)
//! - [`EarlyStopping`] - validation-loss monitor with best-state snapshot
//! - [`Adam`] - optimizer

mod config;
mod early_stopping;
mod neural_network;
mod optimizer;

pub use config::NetworkConfig;
pub use early_stopping::EarlyStopping;
pub use neural_network::{cross_entropy, MlpClassifier, TrainingHistory};
pub use optimizer::{Adam, AdamState};
