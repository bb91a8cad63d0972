//! Building blocks for feed-forward tabular networks

mod layers;

pub use layers::{softmax_rows, BatchNorm1d, Dense, Dropout, PReLU};
