//! Neural-network model lifecycle adapter

use crate::error::{Result, TabMlpError};
use crate::export;
use crate::model::Model;
use crate::preprocessing::{one_hot_encode, StandardScaler};
use crate::training::{MlpClassifier, NetworkConfig};
use ndarray::{Array1, Array2};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default directory for persisted artifacts
pub const DEFAULT_MODEL_DIR: &str = "models";

/// Lifecycle adapter around [`MlpClassifier`] and [`StandardScaler`].
///
/// Owns at most one scaler/model pair, both absent until [`Model::train`] or
/// [`Model::load`] succeeds. The pair is persisted and reloaded together,
/// keyed by `run_fold_name`:
/// `<dir>/<run_fold_name>.model.json` and `<dir>/<run_fold_name>-scaler.json`.
#[derive(Debug)]
pub struct NeuralModel {
    run_fold_name: String,
    config: NetworkConfig,
    model: Option<MlpClassifier>,
    scaler: Option<StandardScaler>,
    model_dir: PathBuf,
}

impl NeuralModel {
    /// Create an untrained adapter for the given run/fold
    pub fn new(run_fold_name: impl Into<String>, config: NetworkConfig) -> Self {
        Self {
            run_fold_name: run_fold_name.into(),
            config,
            model: None,
            scaler: None,
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
        }
    }

    /// Create an adapter from a raw hyperparameter record
    pub fn from_params(
        run_fold_name: impl Into<String>,
        params: &Map<String, Value>,
    ) -> Result<Self> {
        Ok(Self::new(run_fold_name, NetworkConfig::from_params(params)?))
    }

    /// Override the artifact directory
    pub fn with_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = dir.into();
        self
    }

    /// Path of the persisted network artifact
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(format!("{}.model.json", self.run_fold_name))
    }

    /// Path of the persisted scaler artifact
    pub fn scaler_path(&self) -> PathBuf {
        self.model_dir.join(format!("{}-scaler.json", self.run_fold_name))
    }

    /// Artifact directory
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// The trained classifier, if any
    pub fn classifier(&self) -> Option<&MlpClassifier> {
        self.model.as_ref()
    }

    /// The fitted scaler, if any
    pub fn scaler(&self) -> Option<&StandardScaler> {
        self.scaler.as_ref()
    }
}

impl Model for NeuralModel {
    fn train(
        &mut self,
        tr_x: &Array2<f64>,
        tr_y: &Array1<f64>,
        va_x: Option<&Array2<f64>>,
        va_y: Option<&Array1<f64>>,
    ) -> Result<()> {
        let mut scaler = StandardScaler::new();
        let tr_x_scaled = scaler.fit_transform(tr_x)?;
        let tr_y_encoded = one_hot_encode(tr_y, self.config.n_classes)?;

        let validation = match (va_x, va_y) {
            (Some(vx), Some(vy)) => Some((
                scaler.transform(vx)?,
                one_hot_encode(vy, self.config.n_classes)?,
            )),
            (None, None) => None,
            _ => {
                return Err(TabMlpError::DataError(
                    "validation features and labels must be supplied together".to_string(),
                ))
            }
        };

        let mut model = MlpClassifier::new(self.config.clone());
        model.fit(
            &tr_x_scaled,
            &tr_y_encoded,
            validation.as_ref().map(|(x, y)| (x, y)),
        )?;

        info!(
            run = %self.run_fold_name,
            epochs = model.history().epochs_run,
            stopped_early = model.history().stopped_early,
            "training finished"
        );

        self.model = Some(model);
        self.scaler = Some(scaler);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let scaler = self.scaler.as_ref().ok_or(TabMlpError::ModelNotFitted)?;
        let model = self.model.as_ref().ok_or(TabMlpError::ModelNotFitted)?;

        let scaled = scaler.transform(x)?;
        model.predict_proba(&scaled)
    }

    fn save(&self) -> Result<()> {
        let model = self.model.as_ref().ok_or(TabMlpError::ModelNotFitted)?;
        let scaler = self.scaler.as_ref().ok_or(TabMlpError::ModelNotFitted)?;

        export::save_json(model, &self.model_path())?;
        export::save_json(scaler, &self.scaler_path())?;

        info!(run = %self.run_fold_name, dir = %self.model_dir.display(), "artifacts saved");
        Ok(())
    }

    fn load(&mut self) -> Result<()> {
        let model: MlpClassifier = export::load_json(&self.model_path())?;
        let scaler: StandardScaler = export::load_json(&self.scaler_path())?;

        self.model = Some(model);
        self.scaler = Some(scaler);

        info!(run = %self.run_fold_name, dir = %self.model_dir.display(), "artifacts loaded");
        Ok(())
    }

    fn run_fold_name(&self) -> &str {
        &self.run_fold_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_artifact_paths() {
        let model = NeuralModel::new("run1-fold0", NetworkConfig::default())
            .with_model_dir("/tmp/artifacts");

        assert_eq!(
            model.model_path(),
            PathBuf::from("/tmp/artifacts/run1-fold0.model.json")
        );
        assert_eq!(
            model.scaler_path(),
            PathBuf::from("/tmp/artifacts/run1-fold0-scaler.json")
        );
    }

    #[test]
    fn test_from_params_missing_key_fails() {
        let params = json!({ "layers": 2, "units": 32 }).as_object().unwrap().clone();
        assert!(matches!(
            NeuralModel::from_params("run1-fold0", &params),
            Err(TabMlpError::MissingParameter(_))
        ));
    }

    #[test]
    fn test_predict_before_train_fails() {
        let model = NeuralModel::new("run1-fold0", NetworkConfig::default());
        let x = Array2::zeros((2, 3));
        assert!(matches!(
            model.predict(&x),
            Err(TabMlpError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_save_before_train_fails() {
        let model = NeuralModel::new("run1-fold0", NetworkConfig::default());
        assert!(matches!(model.save(), Err(TabMlpError::ModelNotFitted)));
    }

    #[test]
    fn test_mismatched_validation_pair_fails() {
        let mut model = NeuralModel::new("run1-fold0", NetworkConfig::default());
        let x = Array2::zeros((4, 2));
        let y = Array1::zeros(4);

        assert!(matches!(
            model.train(&x, &y, Some(&x), None),
            Err(TabMlpError::DataError(_))
        ));
    }
}
