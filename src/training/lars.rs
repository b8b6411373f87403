//! Least-angle regression with the lasso modification

use super::linalg::pinv_solve;
use super::models::{check_fit_shapes, check_n_features, RegressionEngine};
use crate::error::{PredictorError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Denominators smaller than this never produce a join event
const EVENT_EPS: f64 = 1e-12;

/// Lasso fitted by following the LARS homotopy path down to `alpha`.
///
/// Minimizes `1/(2n) ||y - Xw||² + alpha |w|₁`. Variables join the active set
/// when their correlation with the residual reaches the active level and
/// leave it when their coefficient crosses zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LassoLars {
    pub coefficients: Option<Array1<f64>>,
    pub intercept: f64,
    /// L1 regularization strength
    pub alpha: f64,
    pub max_iter: usize,
    /// Path steps taken by the last fit
    pub n_iter: usize,
}

impl Default for LassoLars {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// What stopped the current step along the path
#[derive(Debug, Clone, Copy, PartialEq)]
enum PathEvent {
    Target,
    Join(usize),
    Drop(usize),
}

impl LassoLars {
    pub fn new(alpha: f64) -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            alpha,
            max_iter: 500,
            n_iter: 0,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    fn solve_path(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Array1<f64> {
        let (n_samples, n_features) = x.dim();
        let lambda = self.alpha * n_samples as f64;
        // Centering removes one degree of freedom
        let max_active = n_features.min(n_samples.saturating_sub(1).max(1));

        let mut w: Array1<f64> = Array1::zeros(n_features);
        let mut active: Vec<usize> = Vec::new();
        let mut signs: Vec<f64> = Vec::new();
        let mut just_dropped: Option<usize> = None;
        self.n_iter = 0;

        if n_features == 0 {
            return w;
        }

        while self.n_iter < self.max_iter {
            let residual = y - &x.dot(&w);
            let corr = x.t().dot(&residual);

            if active.is_empty() {
                let (j, c) = corr
                    .iter()
                    .enumerate()
                    .fold((0, 0.0_f64), |best, (j, &c)| if c.abs() > best.1.abs() { (j, c) } else { best });
                if c.abs() <= lambda || c == 0.0 {
                    break;
                }
                active.push(j);
                signs.push(c.signum());
            }

            let c_max = active.iter().map(|&j| corr[j].abs()).fold(0.0, f64::max);
            if c_max <= lambda + EVENT_EPS {
                break;
            }

            // Equiangular direction: (X_A^T X_A) d = s
            let x_active = x.select(Axis(1), &active);
            let gram = x_active.t().dot(&x_active);
            let direction = pinv_solve(&gram, &Array1::from_vec(signs.clone()));
            let u = x_active.dot(&direction);
            let a = x.t().dot(&u);

            let mut gamma = c_max - lambda;
            let mut event = PathEvent::Target;

            if active.len() < max_active {
                for j in 0..n_features {
                    if active.contains(&j) || just_dropped == Some(j) {
                        continue;
                    }
                    for (num, den) in [(c_max - corr[j], 1.0 - a[j]), (c_max + corr[j], 1.0 + a[j])] {
                        if den.abs() < EVENT_EPS {
                            continue;
                        }
                        let g = num / den;
                        if g > 0.0 && g < gamma {
                            gamma = g;
                            event = PathEvent::Join(j);
                        }
                    }
                }
            }

            for (k, &j) in active.iter().enumerate() {
                if direction[k] == 0.0 {
                    continue;
                }
                let g = -w[j] / direction[k];
                if g > 0.0 && g < gamma {
                    gamma = g;
                    event = PathEvent::Drop(k);
                }
            }

            for (k, &j) in active.iter().enumerate() {
                w[j] += gamma * direction[k];
            }
            self.n_iter += 1;
            just_dropped = None;

            match event {
                PathEvent::Target => break,
                PathEvent::Join(j) => {
                    active.push(j);
                    signs.push((corr[j] - gamma * a[j]).signum());
                }
                PathEvent::Drop(k) => {
                    let j = active.remove(k);
                    signs.remove(k);
                    w[j] = 0.0;
                    just_dropped = Some(j);
                }
            }
        }

        debug!(n_iter = self.n_iter, n_active = active.len(), "LassoLars path finished");
        w
    }
}

impl RegressionEngine for LassoLars {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;

        let x_mean = x.mean_axis(Axis(0)).ok_or_else(|| {
            PredictorError::ComputationError("empty feature matrix".to_string())
        })?;
        let y_mean = y.mean().unwrap_or(0.0);
        let x_c = x - &x_mean.view().insert_axis(Axis(0));
        let y_c = y - y_mean;

        let coefficients = self.solve_path(&x_c, &y_c);
        if coefficients.iter().any(|w| !w.is_finite()) {
            return Err(PredictorError::ComputationError(
                "LARS path produced non-finite coefficients".to_string(),
            ));
        }

        self.intercept = y_mean - coefficients.dot(&x_mean);
        self.coefficients = Some(coefficients);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or(PredictorError::ModelNotFitted)?;
        check_n_features(coefficients.len(), x)?;
        Ok(x.dot(coefficients) + self.intercept)
    }
}
