//! Dataset loading utilities

use crate::error::{Result, TabMlpError};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Loader for tabular training data
pub struct DataLoader {
    has_header: bool,
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a loader with header inference enabled
    pub fn new() -> Self {
        Self {
            has_header: true,
            infer_schema_length: Some(100),
        }
    }

    /// Toggle header row handling
    pub fn with_has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Load a CSV file
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| TabMlpError::DataError(e.to_string()))?;

        let reader = CsvReadOptions::default()
            .with_has_header(self.has_header)
            .with_infer_schema_length(self.infer_schema_length)
            .into_reader_with_file_handle(file);

        let df = reader
            .finish()
            .map_err(|e| TabMlpError::DataError(e.to_string()))?;

        debug!(path = %path.display(), rows = df.height(), cols = df.width(), "csv loaded");
        Ok(df)
    }

    /// Load a CSV file and split it into a feature matrix and a label vector
    pub fn load_dataset(
        &self,
        path: impl AsRef<Path>,
        target_column: &str,
    ) -> Result<(Array2<f64>, Array1<f64>)> {
        let df = self.load_csv(path)?;
        dataset_from_frame(&df, target_column)
    }
}

/// Split a DataFrame into `(features, labels)`, taking every column except
/// `target_column` as a feature.
pub fn dataset_from_frame(
    df: &DataFrame,
    target_column: &str,
) -> Result<(Array2<f64>, Array1<f64>)> {
    let feature_cols: Vec<String> = df
        .get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != target_column)
        .map(|s| s.to_string())
        .collect();

    let target_series = df
        .column(target_column)
        .map_err(|_| TabMlpError::FeatureNotFound(target_column.to_string()))?;
    let target_f64 = target_series
        .cast(&DataType::Float64)
        .map_err(|e| TabMlpError::DataError(e.to_string()))?;
    let y: Array1<f64> = target_f64
        .f64()
        .map_err(|e| TabMlpError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();

    let x = columns_to_array2(df, &feature_cols)?;
    Ok((x, y))
}

/// Extract named columns from a DataFrame into a row-major `Array2<f64>`
fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let series = df
                .column(col_name)
                .map_err(|_| TabMlpError::FeatureNotFound(col_name.clone()))?;
            let series_f64 = series
                .cast(&DataType::Float64)
                .map_err(|e| TabMlpError::DataError(e.to_string()))?;
            let values: Vec<f64> = series_f64
                .f64()
                .map_err(|e| TabMlpError::DataError(e.to_string()))?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
        col_refs[c][r]
    }))
}
