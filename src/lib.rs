//! tabmlp - feed-forward neural-network classification for tabular data
//!
//! This crate covers the full lifecycle of a multi-layer perceptron
//! classifier over a fixed label space:
//!
//! - [`preprocessing`] - feature scaling and one-hot label encoding
//! - [`architectures`] - layer primitives (Dense, PReLU, BatchNorm, Dropout)
//! - [`training`] - configuration, Adam, early stopping, and the classifier
//! - [`model`] - the train/predict/save/load lifecycle keyed by run/fold name
//! - [`export`] - JSON artifact persistence
//! - [`utils`] - CSV dataset loading
//!
//! # Example
//!
//! ```no_run
//! use tabmlp::model::{Model, NeuralModel};
//! use tabmlp::training::NetworkConfig;
//! use tabmlp::utils::DataLoader;
//!
//! # fn main() -> tabmlp::Result<()> {
//! let (x, y) = DataLoader::new().load_dataset("train.csv", "target")?;
//!
//! let mut model = NeuralModel::new("run1-fold0", NetworkConfig::default());
//! model.train(&x, &y, None, None)?;
//! let probabilities = model.predict(&x)?;
//! model.save()?;
//! # Ok(())
//! # }
//! ```

pub mod architectures;
pub mod error;
pub mod export;
pub mod model;
pub mod preprocessing;
pub mod training;
pub mod utils;

pub use error::{Result, TabMlpError};

/// Commonly used types
pub mod prelude {
    pub use crate::error::{Result, TabMlpError};
    pub use crate::model::{Model, NeuralModel};
    pub use crate::preprocessing::{one_hot_encode, StandardScaler};
    pub use crate::training::{Adam, EarlyStopping, MlpClassifier, NetworkConfig, TrainingHistory};
    pub use crate::utils::DataLoader;
}
