//! Stochastic Gradient Descent (SGD) regressor
//!
//! Squared loss with L2 penalty and an inverse-scaling learning rate.
//! Processes one shuffled sample at a time.

use super::models::{check_fit_shapes, check_n_features, RegressionEngine};
use crate::error::{PredictorError, Result};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SGDConfig {
    pub eta0: f64,
    /// L2 regularization
    pub alpha: f64,
    pub max_iter: usize,
    /// Minimum epoch-loss improvement that counts as progress
    pub tol: f64,
    /// Epochs without progress before stopping
    pub n_iter_no_change: usize,
    /// Exponent of the InvScaling schedule
    pub power_t: f64,
    pub random_state: u64,
}

impl Default for SGDConfig {
    fn default() -> Self {
        Self {
            eta0: 0.01,
            alpha: 0.0001,
            max_iter: 1000,
            tol: 1e-3,
            n_iter_no_change: 5,
            power_t: 0.25,
            random_state: 42,
        }
    }
}

impl SGDConfig {
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Learning rate at update `t` (1-based): eta0 / t^power_t
    fn learning_rate(&self, t: usize) -> f64 {
        self.eta0 / (t as f64).powf(self.power_t)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SGDRegressor {
    pub config: SGDConfig,
    pub weights: Option<Array1<f64>>,
    pub bias: f64,
    /// Seed of the shuffling RNG for the next fit
    seed: u64,
    /// Epochs run by the last fit
    pub n_iter: usize,
}

impl SGDRegressor {
    pub fn new(config: SGDConfig) -> Self {
        let seed = config.random_state;
        Self {
            config,
            weights: None,
            bias: 0.0,
            seed,
            n_iter: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RegressionEngine for SGDRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;
        let n = x.nrows();

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);
        let mut w: Array1<f64> = Array1::zeros(x.ncols());
        let mut b = 0.0;
        let mut indices: Vec<usize> = (0..n).collect();
        let mut best_loss = f64::INFINITY;
        let mut no_improvement = 0usize;
        let mut t = 1usize;
        self.n_iter = 0;

        for _epoch in 0..self.config.max_iter {
            indices.shuffle(&mut rng);
            let mut epoch_loss = 0.0;

            for &i in &indices {
                let xi = x.row(i);
                let pred = xi.dot(&w) + b;
                let lr = self.config.learning_rate(t);

                let dloss = pred - y[i];
                epoch_loss += 0.5 * dloss * dloss;

                // L2 shrinkage, then the loss gradient step
                w *= 1.0 - lr * self.config.alpha;
                w.scaled_add(-lr * dloss, &xi);
                b -= lr * dloss;
                t += 1;
            }

            epoch_loss /= n as f64;
            self.n_iter += 1;

            if !epoch_loss.is_finite() {
                return Err(PredictorError::ComputationError(
                    "SGD diverged; try a smaller learning rate or scaled features".to_string(),
                ));
            }

            if epoch_loss > best_loss - self.config.tol {
                no_improvement += 1;
            } else {
                no_improvement = 0;
            }
            best_loss = best_loss.min(epoch_loss);

            if no_improvement >= self.config.n_iter_no_change {
                break;
            }
        }

        if self.n_iter == self.config.max_iter {
            warn!(max_iter = self.config.max_iter, "SGD reached maximum iterations before converging");
        }
        debug!(epochs = self.n_iter, loss = best_loss, "SGD fit finished");

        self.weights = Some(w);
        self.bias = b;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let w = self.weights.as_ref().ok_or(PredictorError::ModelNotFitted)?;
        check_n_features(w.len(), x)?;
        Ok(x.dot(w) + self.bias)
    }

    /// Reseed the shuffling order so repetitions see different sample orders
    fn reinitialize(&mut self, repetition_id: usize) {
        self.seed = self.config.random_state.wrapping_add(repetition_id as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_regression_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((50, 2), |(i, j)| {
            if j == 0 {
                (i % 10) as f64 / 10.0
            } else {
                (i / 10) as f64 / 5.0
            }
        });
        let y = x.rows().into_iter().map(|r| 2.0 * r[0] - r[1] + 0.5).collect();
        (x, y)
    }

    #[test]
    fn test_sgd_regressor_learns_trend() {
        let (x, y) = make_regression_data();
        let config = SGDConfig { eta0: 0.1, ..Default::default() };
        let mut model = SGDRegressor::new(config);
        model.fit(&x, &y).unwrap();

        let r2 = model.score(&x, &y).unwrap();
        assert!(r2 > 0.8, "SGD R² = {}", r2);
        assert!(model.n_iter >= SGDConfig::default().n_iter_no_change);
    }

    #[test]
    fn test_sgd_is_deterministic_per_seed() {
        let (x, y) = make_regression_data();
        let mut a = SGDRegressor::new(SGDConfig::default().with_alpha(0.1));
        let mut b = a.clone();
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.weights, b.weights);

        b.reinitialize(3);
        assert_eq!(b.seed(), 45);
        b.fit(&x, &y).unwrap();
        assert_ne!(a.weights, b.weights);
    }

    #[test]
    fn test_sgd_not_fitted() {
        let model = SGDRegressor::new(SGDConfig::default());
        assert!(matches!(
            model.predict(&Array2::zeros((1, 2))),
            Err(PredictorError::ModelNotFitted)
        ));
    }
}
