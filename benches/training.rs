use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use tabmlp::model::{Model, NeuralModel};
use tabmlp::training::NetworkConfig;

fn create_classification_data(n_rows: usize, n_features: usize) -> (Array2<f64>, Array1<f64>) {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
    let x = Array2::from_shape_fn((n_rows, n_features), |_| rng.gen::<f64>() * 2.0 - 1.0);
    let y: Array1<f64> = x
        .rows()
        .into_iter()
        .map(|row| (((row[0] + 1.0) / 2.0 * 9.0) as usize).min(8) as f64)
        .collect();
    (x, y)
}

fn bench_config() -> NetworkConfig {
    NetworkConfig {
        layers: 2,
        units: 32,
        dropout: 0.1,
        max_epochs: 10,
        patience: 3,
        batch_size: 128,
        n_classes: 9,
        learning_rate: 0.001,
        random_state: Some(42),
    }
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10); // Fewer samples for training benchmarks

    for n_rows in [500, 2000].iter() {
        let (x, y) = create_classification_data(*n_rows, 10);

        group.bench_with_input(
            BenchmarkId::new("train", n_rows),
            &(&x, &y),
            |b, (x, y)| {
                b.iter(|| {
                    let mut model = NeuralModel::new("bench-fold0", bench_config());
                    model.train(black_box(*x), black_box(*y), None, None).unwrap()
                })
            },
        );
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");

    let (x, y) = create_classification_data(2000, 10);
    let mut model = NeuralModel::new("bench-fold0", bench_config());
    model.train(&x, &y, None, None).unwrap();

    for n_rows in [100, 1000].iter() {
        let (x_pred, _) = create_classification_data(*n_rows, 10);

        group.bench_with_input(
            BenchmarkId::new("predict", n_rows),
            &x_pred,
            |b, x_pred| b.iter(|| model.predict(black_box(x_pred)).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_training, bench_prediction);
criterion_main!(benches);
