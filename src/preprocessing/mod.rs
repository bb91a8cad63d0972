//! Data preprocessing
//!
//! Feature scaling and label encoding applied ahead of network training:
//! - [`StandardScaler`] - per-feature z-score normalization
//! - [`one_hot_encode`] - integer labels into a fixed class space

mod encoder;
mod scaler;

pub use encoder::one_hot_encode;
pub use scaler::StandardScaler;
