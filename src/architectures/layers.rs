//! Layer primitives for the feed-forward tabular classifier
//!
//! Each layer exposes a caching `forward_train`, a pure `forward_eval`, and a
//! `backward` that consumes the cached activation. Parameter gradients are held
//! on the layer until the next optimizer step.

use crate::error::{Result, TabMlpError};
use crate::training::{Adam, AdamState};
use ndarray::{Array1, Array2, Axis, Ix1, Ix2};
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Fully-connected affine layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dense {
    weights: Array2<f64>,
    bias: Array1<f64>,
    #[serde(skip)]
    input: Option<Array2<f64>>,
    #[serde(skip)]
    grad_w: Option<Array2<f64>>,
    #[serde(skip)]
    grad_b: Option<Array1<f64>>,
    #[serde(skip)]
    opt_w: AdamState<Ix2>,
    #[serde(skip)]
    opt_b: AdamState<Ix1>,
}

impl Dense {
    /// Create a layer with Xavier/Glorot-initialized weights
    pub fn new(n_in: usize, n_out: usize, rng: &mut Xoshiro256PlusPlus) -> Self {
        let scale = (2.0 / (n_in + n_out) as f64).sqrt();
        let weights: Vec<f64> = (0..n_in * n_out)
            .map(|_| rng.gen::<f64>() * 2.0 * scale - scale)
            .collect();

        Self {
            weights: Array2::from_shape_vec((n_in, n_out), weights).unwrap(),
            bias: Array1::zeros(n_out),
            input: None,
            grad_w: None,
            grad_b: None,
            opt_w: AdamState::default(),
            opt_b: AdamState::default(),
        }
    }

    pub fn forward_train(&mut self, x: &Array2<f64>) -> Array2<f64> {
        self.input = Some(x.clone());
        x.dot(&self.weights) + &self.bias
    }

    pub fn forward_eval(&self, x: &Array2<f64>) -> Array2<f64> {
        x.dot(&self.weights) + &self.bias
    }

    pub fn backward(&mut self, delta: &Array2<f64>) -> Result<Array2<f64>> {
        let input = self.input.take().ok_or_else(|| {
            TabMlpError::TrainingError("dense backward called before forward".to_string())
        })?;

        self.grad_w = Some(input.t().dot(delta));
        self.grad_b = Some(delta.sum_axis(Axis(0)));
        Ok(delta.dot(&self.weights.t()))
    }

    pub fn update(&mut self, opt: &Adam, t: usize) {
        if let (Some(gw), Some(gb)) = (self.grad_w.take(), self.grad_b.take()) {
            self.opt_w.step(&mut self.weights, &gw, opt, t);
            self.opt_b.step(&mut self.bias, &gb, opt, t);
        }
    }

    pub fn n_out(&self) -> usize {
        self.bias.len()
    }
}

/// Parametric ReLU with a learnable per-channel negative slope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PReLU {
    alpha: Array1<f64>,
    #[serde(skip)]
    input: Option<Array2<f64>>,
    #[serde(skip)]
    grad_alpha: Option<Array1<f64>>,
    #[serde(skip)]
    opt_alpha: AdamState<Ix1>,
}

impl PReLU {
    pub fn new(n_channels: usize) -> Self {
        Self {
            alpha: Array1::from_elem(n_channels, 0.25),
            input: None,
            grad_alpha: None,
            opt_alpha: AdamState::default(),
        }
    }

    fn activate(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut y = x.clone();
        for (j, mut col) in y.axis_iter_mut(Axis(1)).enumerate() {
            let a = self.alpha[j];
            col.mapv_inplace(|v| if v < 0.0 { a * v } else { v });
        }
        y
    }

    pub fn forward_train(&mut self, x: &Array2<f64>) -> Array2<f64> {
        let y = self.activate(x);
        self.input = Some(x.clone());
        y
    }

    pub fn forward_eval(&self, x: &Array2<f64>) -> Array2<f64> {
        self.activate(x)
    }

    pub fn backward(&mut self, delta: &Array2<f64>) -> Result<Array2<f64>> {
        let input = self.input.take().ok_or_else(|| {
            TabMlpError::TrainingError("prelu backward called before forward".to_string())
        })?;

        let mut dx = delta.clone();
        let mut grad_alpha = Array1::zeros(self.alpha.len());
        for ((i, j), v) in input.indexed_iter() {
            if *v < 0.0 {
                grad_alpha[j] += delta[[i, j]] * *v;
                dx[[i, j]] = delta[[i, j]] * self.alpha[j];
            }
        }

        self.grad_alpha = Some(grad_alpha);
        Ok(dx)
    }

    pub fn update(&mut self, opt: &Adam, t: usize) {
        if let Some(ga) = self.grad_alpha.take() {
            self.opt_alpha.step(&mut self.alpha, &ga, opt, t);
        }
    }
}

#[derive(Debug, Clone)]
struct BnCache {
    xhat: Array2<f64>,
    std: Array1<f64>,
}

/// Batch normalization over feature columns
///
/// Training passes normalize with batch statistics and update the running
/// mean/variance; evaluation passes normalize with the running statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchNorm1d {
    gamma: Array1<f64>,
    beta: Array1<f64>,
    running_mean: Array1<f64>,
    running_var: Array1<f64>,
    momentum: f64,
    eps: f64,
    #[serde(skip)]
    cache: Option<BnCache>,
    #[serde(skip)]
    grad_gamma: Option<Array1<f64>>,
    #[serde(skip)]
    grad_beta: Option<Array1<f64>>,
    #[serde(skip)]
    opt_gamma: AdamState<Ix1>,
    #[serde(skip)]
    opt_beta: AdamState<Ix1>,
}

impl BatchNorm1d {
    pub fn new(n_features: usize) -> Self {
        Self {
            gamma: Array1::ones(n_features),
            beta: Array1::zeros(n_features),
            running_mean: Array1::zeros(n_features),
            running_var: Array1::ones(n_features),
            momentum: 0.01,
            eps: 1e-5,
            cache: None,
            grad_gamma: None,
            grad_beta: None,
            opt_gamma: AdamState::default(),
            opt_beta: AdamState::default(),
        }
    }

    pub fn forward_train(&mut self, x: &Array2<f64>) -> Array2<f64> {
        let mean = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(x.ncols()));
        let var = x.var_axis(Axis(0), 0.0);

        self.running_mean = &self.running_mean * (1.0 - self.momentum) + &mean * self.momentum;
        self.running_var = &self.running_var * (1.0 - self.momentum) + &var * self.momentum;

        let std = var.mapv(|v| (v + self.eps).sqrt());
        let xhat = (x - &mean) / &std;
        let y = &xhat * &self.gamma + &self.beta;

        self.cache = Some(BnCache { xhat, std });
        y
    }

    pub fn forward_eval(&self, x: &Array2<f64>) -> Array2<f64> {
        let std = self.running_var.mapv(|v| (v + self.eps).sqrt());
        let xhat = (x - &self.running_mean) / &std;
        &xhat * &self.gamma + &self.beta
    }

    pub fn backward(&mut self, delta: &Array2<f64>) -> Result<Array2<f64>> {
        let BnCache { xhat, std } = self.cache.take().ok_or_else(|| {
            TabMlpError::TrainingError("batchnorm backward called before forward".to_string())
        })?;

        let n = delta.nrows() as f64;
        self.grad_gamma = Some((delta * &xhat).sum_axis(Axis(0)));
        self.grad_beta = Some(delta.sum_axis(Axis(0)));

        let dxhat = delta * &self.gamma;
        let sum_dxhat = dxhat.sum_axis(Axis(0));
        let sum_dxhat_xhat = (&dxhat * &xhat).sum_axis(Axis(0));

        let dx = (&dxhat * n - &sum_dxhat - &xhat * &sum_dxhat_xhat) / &(std * n);
        Ok(dx)
    }

    pub fn update(&mut self, opt: &Adam, t: usize) {
        if let (Some(gg), Some(gb)) = (self.grad_gamma.take(), self.grad_beta.take()) {
            self.opt_gamma.step(&mut self.gamma, &gg, opt, t);
            self.opt_beta.step(&mut self.beta, &gb, opt, t);
        }
    }
}

/// Inverted dropout: scales kept units by 1/(1-rate) at train time so the
/// evaluation pass is the identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dropout {
    rate: f64,
    #[serde(skip)]
    mask: Option<Array2<f64>>,
}

impl Dropout {
    pub fn new(rate: f64) -> Self {
        Self { rate, mask: None }
    }

    pub fn forward_train(&mut self, x: &Array2<f64>, rng: &mut Xoshiro256PlusPlus) -> Array2<f64> {
        if self.rate <= 0.0 {
            self.mask = None;
            return x.clone();
        }

        let keep = 1.0 - self.rate;
        let mask = Array2::from_shape_fn(x.raw_dim(), |_| {
            if rng.gen::<f64>() < keep {
                1.0 / keep
            } else {
                0.0
            }
        });
        let y = x * &mask;
        self.mask = Some(mask);
        y
    }

    pub fn forward_eval(&self, x: &Array2<f64>) -> Array2<f64> {
        x.clone()
    }

    pub fn backward(&mut self, delta: &Array2<f64>) -> Result<Array2<f64>> {
        match self.mask.take() {
            Some(mask) => Ok(delta * &mask),
            None => Ok(delta.clone()),
        }
    }
}

/// Numerically stable row-wise softmax
pub fn softmax_rows(x: &Array2<f64>) -> Array2<f64> {
    let mut result = x.clone();
    for mut row in result.rows_mut() {
        let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exp_sum: f64 = row.iter().map(|&v| (v - max).exp()).sum();
        for v in row.iter_mut() {
            *v = (*v - max).exp() / exp_sum;
        }
    }
    result
}
