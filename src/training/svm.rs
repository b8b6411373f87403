//! Support Vector Regression
//!
//! Epsilon-SVR trained with SMO (Sequential Minimal Optimization) on the dual
//! problem, using maximal-violating-pair working set selection.

use super::models::{check_fit_shapes, check_n_features, RegressionEngine};
use crate::error::{PredictorError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Maximum number of samples for eager kernel matrix computation.
/// Beyond this, training will return an error to prevent OOM.
const MAX_KERNEL_MATRIX_SAMPLES: usize = 10_000;

/// Smallest curvature used for an SMO step
const TAU: f64 = 1e-12;

/// Kernel function type.
///
/// A `gamma` of `None` means `1 / n_features`, resolved at fit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KernelType {
    /// Linear kernel: K(x, y) = x · y
    Linear,
    /// Polynomial kernel: K(x, y) = (γ * x · y + r)^d
    Polynomial {
        degree: u32,
        gamma: Option<f64>,
        coef0: f64,
    },
    /// Radial Basis Function (Gaussian): K(x, y) = exp(-γ * ||x - y||²)
    RBF { gamma: Option<f64> },
}

impl Default for KernelType {
    fn default() -> Self {
        KernelType::RBF { gamma: None }
    }
}

impl KernelType {
    /// Polynomial kernel of the given degree with default gamma and no offset
    pub fn polynomial(degree: u32) -> Self {
        KernelType::Polynomial {
            degree,
            gamma: None,
            coef0: 0.0,
        }
    }

    fn gamma(&self, n_features: usize) -> f64 {
        let explicit = match self {
            KernelType::Linear => None,
            KernelType::Polynomial { gamma, .. } | KernelType::RBF { gamma } => *gamma,
        };
        explicit.unwrap_or(1.0 / n_features.max(1) as f64)
    }

    fn evaluate(&self, gamma: f64, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        match self {
            KernelType::Linear => a.dot(&b),
            KernelType::Polynomial { degree, coef0, .. } => {
                (gamma * a.dot(&b) + coef0).powi((*degree).min(i32::MAX as u32) as i32)
            }
            KernelType::RBF { .. } => {
                let norm_sq: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum();
                (-gamma * norm_sq).exp()
            }
        }
    }
}

/// SVM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SVMConfig {
    /// Regularization parameter (C)
    pub c: f64,
    /// Kernel function
    pub kernel: KernelType,
    /// Tolerance for stopping criterion
    pub tol: f64,
    /// Maximum number of SMO iterations
    pub max_iter: usize,
    /// Epsilon for regression (SVR tube width)
    pub epsilon: f64,
}

impl Default for SVMConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            kernel: KernelType::default(),
            tol: 1e-3,
            max_iter: 100_000,
            epsilon: 0.1,
        }
    }
}

impl SVMConfig {
    pub fn with_kernel(mut self, kernel: KernelType) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }
}

/// Support Vector Regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SVMRegressor {
    config: SVMConfig,
    /// Copies of the training rows with non-zero dual coefficients
    support_vectors: Option<Array2<f64>>,
    /// alpha - alpha* for each support vector
    dual_coef: Option<Array1<f64>>,
    bias: f64,
    /// Kernel gamma resolved against the training data
    gamma: f64,
}

impl SVMRegressor {
    /// Create a new SVM regressor
    pub fn new(config: SVMConfig) -> Self {
        Self {
            config,
            support_vectors: None,
            dual_coef: None,
            bias: 0.0,
            gamma: 1.0,
        }
    }

    pub fn config(&self) -> &SVMConfig {
        &self.config
    }

    /// Intercept of the decision function
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Get number of support vectors
    pub fn n_support_vectors(&self) -> usize {
        self.support_vectors.as_ref().map(|sv| sv.nrows()).unwrap_or(0)
    }

    fn compute_kernel_matrix(&self, x: &Array2<f64>) -> Array2<f64> {
        let n = x.nrows();
        let kernel = &self.config.kernel;
        let gamma = self.gamma;

        // For small matrices, sequential is faster due to overhead
        if n < 100 {
            let mut k = Array2::zeros((n, n));
            for i in 0..n {
                for j in i..n {
                    let val = kernel.evaluate(gamma, x.row(i), x.row(j));
                    k[[i, j]] = val;
                    k[[j, i]] = val;
                }
            }
            return k;
        }

        // Parallel: compute upper triangle rows in parallel
        let rows: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| (i..n).map(|j| kernel.evaluate(gamma, x.row(i), x.row(j))).collect())
            .collect();

        let mut k = Array2::zeros((n, n));
        for (i, row_vals) in rows.into_iter().enumerate() {
            for (offset, val) in row_vals.into_iter().enumerate() {
                let j = i + offset;
                k[[i, j]] = val;
                k[[j, i]] = val;
            }
        }
        k
    }

    /// Solve the 2n-variable dual; returns per-sample `alpha - alpha*` and the bias
    fn smo_train(&self, k: &Array2<f64>, y: &Array1<f64>) -> (Array1<f64>, f64) {
        let n = y.len();
        let c = self.config.c;
        let eps = self.config.epsilon;

        // Variable t < n is alpha_t (sign +1), t >= n is alpha*_{t-n} (sign -1)
        let sign = |t: usize| if t < n { 1.0 } else { -1.0 };
        let sample = |t: usize| if t < n { t } else { t - n };

        let mut alpha = vec![0.0; 2 * n];
        let mut grad: Vec<f64> = (0..2 * n)
            .map(|t| if t < n { eps - y[t] } else { eps + y[t - n] })
            .collect();

        let in_up = |a: f64, s: f64| (s > 0.0 && a < c) || (s < 0.0 && a > 0.0);
        let in_low = |a: f64, s: f64| (s > 0.0 && a > 0.0) || (s < 0.0 && a < c);

        let mut iter = 0;
        while iter < self.config.max_iter {
            let mut gmax = f64::NEG_INFINITY;
            let mut gmin = f64::INFINITY;
            let mut i_sel = None;
            let mut j_sel = None;

            for t in 0..2 * n {
                let s = sign(t);
                let v = -s * grad[t];
                if in_up(alpha[t], s) && v > gmax {
                    gmax = v;
                    i_sel = Some(t);
                }
                if in_low(alpha[t], s) && v < gmin {
                    gmin = v;
                    j_sel = Some(t);
                }
            }

            let (i, j) = match (i_sel, j_sel) {
                (Some(i), Some(j)) if gmax - gmin >= self.config.tol => (i, j),
                _ => break,
            };

            let (si, sj) = (sample(i), sample(j));
            let eta = (k[[si, si]] + k[[sj, sj]] - 2.0 * k[[si, sj]]).max(TAU);
            let bound_i = if sign(i) > 0.0 { c - alpha[i] } else { alpha[i] };
            let bound_j = if sign(j) > 0.0 { alpha[j] } else { c - alpha[j] };
            let step = ((gmax - gmin) / eta).min(bound_i).min(bound_j);

            alpha[i] = snap(alpha[i] + sign(i) * step, c);
            alpha[j] = snap(alpha[j] - sign(j) * step, c);

            for t in 0..2 * n {
                let st = sample(t);
                grad[t] += sign(t) * step * (k[[st, si]] - k[[st, sj]]);
            }
            iter += 1;
        }

        if iter >= self.config.max_iter {
            warn!(max_iter = self.config.max_iter, "SVR solver reached maximum iterations");
        }

        let rho = Self::compute_rho(&alpha, &grad, c, n);
        let dual_coef = Array1::from_shape_fn(n, |s| alpha[s] - alpha[s + n]);
        debug!(iterations = iter, rho, "SVR solver finished");
        (dual_coef, -rho)
    }

    /// Offset of the decision function: average over free variables, or the
    /// midpoint of the feasible interval when every variable sits at a bound.
    fn compute_rho(alpha: &[f64], grad: &[f64], c: f64, n: usize) -> f64 {
        let mut ub = f64::INFINITY;
        let mut lb = f64::NEG_INFINITY;
        let mut sum_free = 0.0;
        let mut n_free = 0usize;

        for t in 0..2 * n {
            let s = if t < n { 1.0 } else { -1.0 };
            let yg = s * grad[t];
            if alpha[t] >= c {
                if s < 0.0 {
                    ub = ub.min(yg);
                } else {
                    lb = lb.max(yg);
                }
            } else if alpha[t] <= 0.0 {
                if s > 0.0 {
                    ub = ub.min(yg);
                } else {
                    lb = lb.max(yg);
                }
            } else {
                n_free += 1;
                sum_free += yg;
            }
        }

        if n_free > 0 {
            sum_free / n_free as f64
        } else {
            (ub + lb) / 2.0
        }
    }
}

/// Clamp to [0, c], snapping values within rounding distance onto the bounds
fn snap(value: f64, c: f64) -> f64 {
    if value <= 1e-12 {
        0.0
    } else if value >= c - 1e-12 {
        c
    } else {
        value
    }
}

impl RegressionEngine for SVMRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;
        let n = x.nrows();

        if n > MAX_KERNEL_MATRIX_SAMPLES {
            return Err(PredictorError::ComputationError(format!(
                "Dataset has {} samples, exceeding the maximum {} for SVR kernel matrix. \
                 Consider subsampling or using a different algorithm.",
                n, MAX_KERNEL_MATRIX_SAMPLES
            )));
        }

        self.gamma = self.config.kernel.gamma(x.ncols());
        let kernel_matrix = self.compute_kernel_matrix(x);
        let (dual_coef, bias) = self.smo_train(&kernel_matrix, y);

        if !bias.is_finite() {
            return Err(PredictorError::ComputationError(
                "SVR solver produced a non-finite bias".to_string(),
            ));
        }

        let support_indices: Vec<usize> = dual_coef
            .iter()
            .enumerate()
            .filter(|(_, a)| **a != 0.0)
            .map(|(i, _)| i)
            .collect();

        self.support_vectors = Some(x.select(Axis(0), &support_indices));
        self.dual_coef = Some(dual_coef.select(Axis(0), &support_indices));
        self.bias = bias;
        Ok(())
    }

    /// Predict target values
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (sv, coef) = match (&self.support_vectors, &self.dual_coef) {
            (Some(sv), Some(coef)) => (sv, coef),
            _ => return Err(PredictorError::ModelNotFitted),
        };
        check_n_features(sv.ncols(), x)?;

        let kernel = &self.config.kernel;
        Ok(Array1::from_shape_fn(x.nrows(), |i| {
            let sample = x.row(i);
            sv.outer_iter()
                .zip(coef.iter())
                .map(|(row, a)| a * kernel.evaluate(self.gamma, sample, row))
                .sum::<f64>()
                + self.bias
        }))
    }
}
