//! Feature scaling

use crate::error::{Result, TabMlpError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Standard (z-score) feature scaler: (x - mean) / std per feature column.
///
/// Fitted statistics are serializable so the scaler can be persisted next to
/// the model it was fitted for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Array1<f64>,
    std: Array1<f64>,
    is_fitted: bool,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    /// Create an unfitted scaler
    pub fn new() -> Self {
        Self {
            mean: Array1::zeros(0),
            std: Array1::zeros(0),
            is_fitted: false,
        }
    }

    /// Fit the scaler to the data
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        if x.nrows() == 0 {
            return Err(TabMlpError::DataError(
                "cannot fit scaler on an empty matrix".to_string(),
            ));
        }

        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| TabMlpError::DataError("cannot compute feature means".to_string()))?;
        // Zero-variance features scale by 1.0 so constant columns pass through centered
        let std = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s == 0.0 { 1.0 } else { s });

        self.mean = mean;
        self.std = std;
        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data using the fitted statistics
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(TabMlpError::ModelNotFitted);
        }
        self.check_width(x)?;
        Ok((x - &self.mean) / &self.std)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Map scaled data back to the original feature space
    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(TabMlpError::ModelNotFitted);
        }
        self.check_width(x)?;
        Ok(x * &self.std + &self.mean)
    }

    /// Number of features the scaler was fitted on
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn check_width(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() != self.mean.len() {
            return Err(TabMlpError::ShapeError {
                expected: format!("{} features", self.mean.len()),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(())
    }
}
