//! Integration test: CSV loading through training to prediction

use serde_json::json;
use std::io::Write;
use tabmlp::model::{Model, NeuralModel};
use tabmlp::utils::DataLoader;

#[test]
fn test_train_from_csv() {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .unwrap();
    writeln!(file, "f0,f1,f2,target").unwrap();
    for i in 0..60 {
        let v = (i % 30) as f64 / 30.0;
        let class = i % 3;
        writeln!(file, "{},{},{},{}", v, 1.0 - v, v * 2.0, class).unwrap();
    }
    file.flush().unwrap();

    let (x, y) = DataLoader::new()
        .load_dataset(file.path(), "target")
        .unwrap();
    assert_eq!(x.shape(), &[60, 3]);
    assert_eq!(y.len(), 60);

    let params = json!({
        "layers": 1,
        "units": 8,
        "dropout": 0.1,
        "max_epochs": 15,
        "patience": 3,
        "n_classes": 3,
        "batch_size": 16
    })
    .as_object()
    .unwrap()
    .clone();

    let mut model = NeuralModel::from_params("csv-fold0", &params).unwrap();
    model.train(&x, &y, None, None).unwrap();

    let probs = model.predict(&x).unwrap();
    assert_eq!(probs.ncols(), 3);
    for row in probs.rows() {
        assert!((row.sum() - 1.0).abs() < 1e-9);
    }
}
