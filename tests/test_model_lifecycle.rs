//! Integration tests for the model lifecycle: train, predict, save, load

use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use tabmlp::error::TabMlpError;
use tabmlp::model::{Model, NeuralModel};
use tabmlp::training::NetworkConfig;

fn nine_class_data(n: usize, seed: u64) -> (Array2<f64>, Array1<f64>) {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let x = Array2::from_shape_fn((n, 4), |_| rng.gen::<f64>() * 2.0 - 1.0);
    // Labels follow the first feature so the problem is learnable
    let y: Array1<f64> = x
        .rows()
        .into_iter()
        .map(|row| (((row[0] + 1.0) / 2.0 * 9.0) as usize).min(8) as f64)
        .collect();
    (x, y)
}

fn noise_data(n: usize, seed: u64) -> (Array2<f64>, Array1<f64>) {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let x = Array2::from_shape_fn((n, 4), |_| rng.gen::<f64>() * 2.0 - 1.0);
    let y: Array1<f64> = (0..n).map(|i| (i % 9) as f64).collect();
    (x, y)
}

fn quick_config() -> NetworkConfig {
    NetworkConfig {
        layers: 1,
        units: 16,
        dropout: 0.0,
        max_epochs: 30,
        patience: 5,
        batch_size: 32,
        n_classes: 9,
        learning_rate: 0.01,
        random_state: Some(42),
    }
}

fn temp_model_dir(tag: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("tabmlp_test_{}_{}", tag, std::process::id()))
}

// ============================================================================
// Predict gating
// ============================================================================

#[test]
fn test_predict_before_train_or_load_fails() {
    let model = NeuralModel::new("gate-fold0", quick_config());
    let x = Array2::zeros((3, 4));

    assert!(matches!(
        model.predict(&x),
        Err(TabMlpError::ModelNotFitted)
    ));
}

// ============================================================================
// Probability outputs
// ============================================================================

#[test]
fn test_predictions_are_probability_distributions() {
    let (x, y) = nine_class_data(180, 3);

    let mut model = NeuralModel::new("proba-fold0", quick_config());
    model.train(&x, &y, None, None).unwrap();

    let probs = model.predict(&x).unwrap();
    assert_eq!(probs.nrows(), x.nrows());
    assert_eq!(probs.ncols(), 9);
    for row in probs.rows() {
        assert!((row.sum() - 1.0).abs() < 1e-9);
        for p in row {
            assert!(*p >= 0.0 && *p <= 1.0);
        }
    }
}

// ============================================================================
// Save / load round trip
// ============================================================================

#[test]
fn test_save_then_load_round_trip_preserves_predictions() {
    let (x, y) = nine_class_data(150, 5);
    let dir = temp_model_dir("roundtrip");

    let mut trained =
        NeuralModel::new("rt-fold0", quick_config()).with_model_dir(&dir);
    trained.train(&x, &y, None, None).unwrap();
    let before = trained.predict(&x).unwrap();
    trained.save().unwrap();

    let mut reloaded =
        NeuralModel::new("rt-fold0", quick_config()).with_model_dir(&dir);
    reloaded.load().unwrap();
    let after = reloaded.predict(&x).unwrap();

    assert_eq!(before.shape(), after.shape());
    for (b, a) in before.iter().zip(after.iter()) {
        assert!((b - a).abs() < 1e-12, "prediction drifted: {} vs {}", b, a);
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_save_creates_both_artifacts() {
    let (x, y) = nine_class_data(90, 11);
    let dir = temp_model_dir("artifacts");

    let mut model =
        NeuralModel::new("art-fold2", quick_config()).with_model_dir(&dir);
    model.train(&x, &y, None, None).unwrap();
    model.save().unwrap();

    assert!(dir.join("art-fold2.model.json").exists());
    assert!(dir.join("art-fold2-scaler.json").exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_load_without_artifacts_fails() {
    let dir = temp_model_dir("missing");

    let mut model =
        NeuralModel::new("missing-fold0", quick_config()).with_model_dir(&dir);
    assert!(matches!(
        model.load(),
        Err(TabMlpError::ArtifactMissing(_))
    ));
}

// ============================================================================
// Early stopping
// ============================================================================

#[test]
fn test_zero_patience_stops_at_first_non_improving_epoch() {
    let (tr_x, tr_y) = noise_data(64, 17);
    let (va_x, va_y) = noise_data(32, 23);

    let config = NetworkConfig {
        layers: 1,
        units: 8,
        dropout: 0.0,
        max_epochs: 300,
        patience: 0,
        batch_size: 16,
        n_classes: 9,
        learning_rate: 0.05,
        random_state: Some(42),
    };

    let mut model = NeuralModel::new("patience-fold0", config);
    model
        .train(&tr_x, &tr_y, Some(&va_x), Some(&va_y))
        .unwrap();

    let history = model.classifier().unwrap().history();
    assert!(history.stopped_early, "training ran all 300 epochs on noise");
    assert!(history.epochs_run < 300);
    assert_eq!(history.val_loss.len(), history.epochs_run);

    // With zero patience the run only continues while the validation loss is
    // strictly improving, so every epoch but the last must improve on its
    // predecessor and the last must not.
    let val = &history.val_loss;
    for i in 1..val.len() - 1 {
        assert!(val[i] < val[i - 1], "epoch {} did not improve yet training continued", i);
    }
    let last = val[val.len() - 1];
    let best = val[..val.len() - 1]
        .iter()
        .cloned()
        .fold(f64::INFINITY, f64::min);
    assert!(!(last < best), "stopped on an improving epoch");
}

#[test]
fn test_training_without_validation_runs_to_max_epochs() {
    let (x, y) = nine_class_data(80, 29);

    let mut config = quick_config();
    config.max_epochs = 9;
    let mut model = NeuralModel::new("full-fold0", config);
    model.train(&x, &y, None, None).unwrap();

    let history = model.classifier().unwrap().history();
    assert_eq!(history.epochs_run, 9);
    assert!(!history.stopped_early);
}
