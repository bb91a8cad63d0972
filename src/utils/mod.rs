//! Shared utilities

mod data_loader;

pub use data_loader::{dataset_from_frame, DataLoader};
