//! Linear model implementations

use super::linalg::{cholesky_solve, pinv_solve};
use super::models::{check_fit_shapes, check_n_features, RegressionEngine};
use crate::error::{PredictorError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Training data with column means removed
struct Centered {
    x: Array2<f64>,
    y: Array1<f64>,
    x_mean: Array1<f64>,
    y_mean: f64,
}

impl Centered {
    fn new(x: &Array2<f64>, y: &Array1<f64>) -> Result<Self> {
        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| PredictorError::ComputationError("empty feature matrix".to_string()))?;
        let y_mean = y.mean().unwrap_or(0.0);

        Ok(Self {
            x: x - &x_mean.view().insert_axis(Axis(0)),
            y: y - y_mean,
            x_mean,
            y_mean,
        })
    }

    fn intercept(&self, coefficients: &Array1<f64>) -> f64 {
        self.y_mean - coefficients.dot(&self.x_mean)
    }
}

/// Predict with fitted linear parameters
fn linear_predict(
    coefficients: Option<&Array1<f64>>,
    intercept: f64,
    x: &Array2<f64>,
) -> Result<Array1<f64>> {
    let coefficients = coefficients.ok_or(PredictorError::ModelNotFitted)?;
    check_n_features(coefficients.len(), x)?;
    Ok(x.dot(coefficients) + intercept)
}

/// Soft-threshold operator for L1 proximal step
fn soft_threshold(val: f64, threshold: f64) -> f64 {
    if val > threshold {
        val - threshold
    } else if val < -threshold {
        val + threshold
    } else {
        0.0
    }
}

/// Ordinary least squares.
///
/// Rank-deficient systems get the minimum-norm solution, so more features
/// than samples is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Fitted coefficients (weights)
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept (bias)
    pub intercept: f64,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    /// Create a new linear regression model
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }
}

impl RegressionEngine for LinearRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;
        let data = Centered::new(x, y)?;

        // Normal equations (X^T X) w = X^T y, minimum-norm solution
        let xtx = data.x.t().dot(&data.x);
        let xty = data.x.t().dot(&data.y);
        let coefficients = pinv_solve(&xtx, &xty);

        self.intercept = data.intercept(&coefficients);
        self.coefficients = Some(coefficients);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        linear_predict(self.coefficients.as_ref(), self.intercept, x)
    }
}

/// Ridge Regression (L2-regularized linear regression)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RidgeRegression {
    pub coefficients: Option<Array1<f64>>,
    pub intercept: f64,
    /// L2 regularization strength
    pub alpha: f64,
}

impl Default for RidgeRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RidgeRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            alpha,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }
}

impl RegressionEngine for RidgeRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;
        let data = Centered::new(x, y)?;

        let mut xtx = data.x.t().dot(&data.x);
        for i in 0..x.ncols() {
            xtx[[i, i]] += self.alpha;
        }
        let xty = data.x.t().dot(&data.y);

        // alpha = 0 degenerates to OLS, which may be singular
        let coefficients = cholesky_solve(&xtx, &xty).unwrap_or_else(|| pinv_solve(&xtx, &xty));

        self.intercept = data.intercept(&coefficients);
        self.coefficients = Some(coefficients);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        linear_predict(self.coefficients.as_ref(), self.intercept, x)
    }
}

/// Lasso Regression (L1-regularized via coordinate descent)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LassoRegression {
    pub coefficients: Option<Array1<f64>>,
    pub intercept: f64,
    /// L1 regularization strength
    pub alpha: f64,
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for LassoRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl LassoRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            alpha,
            max_iter: 1000,
            tol: 1e-6,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }
}

impl RegressionEngine for LassoRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;
        let data = Centered::new(x, y)?;
        let lambda = self.alpha * x.nrows() as f64;

        let coefficients = coordinate_descent(&data, lambda, 0.0, self.max_iter, self.tol);

        self.intercept = data.intercept(&coefficients);
        self.coefficients = Some(coefficients);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        linear_predict(self.coefficients.as_ref(), self.intercept, x)
    }
}

/// Elastic Net Regression (L1 + L2 regularization via coordinate descent)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticNetRegression {
    pub coefficients: Option<Array1<f64>>,
    pub intercept: f64,
    /// Overall regularization strength
    pub alpha: f64,
    /// L1 ratio (0.0 = pure L2/Ridge, 1.0 = pure L1/Lasso)
    pub l1_ratio: f64,
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for ElasticNetRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ElasticNetRegression {
    /// Equal L1/L2 mixing; see [`ElasticNetRegression::with_l1_ratio`]
    pub fn new(alpha: f64) -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            alpha,
            l1_ratio: 0.5,
            max_iter: 1000,
            tol: 1e-6,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_l1_ratio(mut self, l1_ratio: f64) -> Self {
        self.l1_ratio = l1_ratio.clamp(0.0, 1.0);
        self
    }
}

impl RegressionEngine for ElasticNetRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;
        let data = Centered::new(x, y)?;
        let n = x.nrows() as f64;
        let l1_penalty = self.alpha * self.l1_ratio * n;
        let l2_penalty = self.alpha * (1.0 - self.l1_ratio) * n;

        let coefficients =
            coordinate_descent(&data, l1_penalty, l2_penalty, self.max_iter, self.tol);

        self.intercept = data.intercept(&coefficients);
        self.coefficients = Some(coefficients);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        linear_predict(self.coefficients.as_ref(), self.intercept, x)
    }
}

/// Cyclic coordinate descent on `1/2 ||y - Xw||² + l1 |w|₁ + l2/2 ||w||²`
fn coordinate_descent(
    data: &Centered,
    l1_penalty: f64,
    l2_penalty: f64,
    max_iter: usize,
    tol: f64,
) -> Array1<f64> {
    let n_features = data.x.ncols();
    let col_norms: Vec<f64> = (0..n_features)
        .map(|j| data.x.column(j).mapv(|v| v * v).sum())
        .collect();

    let mut w = Array1::zeros(n_features);

    for _iter in 0..max_iter {
        let w_old = w.clone();

        // Compute residual once before coordinate loop
        let mut r = &data.y - &data.x.dot(&w);

        for j in 0..n_features {
            let denom = col_norms[j] + l2_penalty;
            if col_norms[j] < 1e-15 || denom < 1e-15 {
                w[j] = 0.0;
                continue;
            }
            // Incremental residual: rho = x_j^T r + col_norms[j] * w[j]
            let rho = data.x.column(j).dot(&r) + col_norms[j] * w[j];
            let old_wj = w[j];
            w[j] = soft_threshold(rho, l1_penalty) / denom;
            if old_wj != w[j] {
                r.scaled_add(old_wj - w[j], &data.x.column(j));
            }
        }

        let diff = (&w - &w_old).mapv(|v| v.abs()).sum();
        if diff < tol {
            break;
        }
    }

    w
}

// ============ Polynomial Regression ============

/// Polynomial Regression: every monomial of the inputs up to `degree`, fitted
/// with ordinary least squares.
///
/// Terms are ordered by total degree, then lexicographically by the indices
/// of the features involved. No constant column is produced; the intercept
/// comes from the inner least-squares model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolynomialRegression {
    pub degree: usize,
    inner: LinearRegression,
    /// Feature indices multiplied together for each expanded column
    terms: Vec<Vec<usize>>,
    n_original_features: usize,
}

impl PolynomialRegression {
    pub fn new(degree: usize) -> Self {
        Self {
            degree: degree.max(1),
            inner: LinearRegression::new(),
            terms: Vec::new(),
            n_original_features: 0,
        }
    }

    /// Index tuples of all monomials of total degree 1..=degree
    fn monomials(n_features: usize, degree: usize) -> Vec<Vec<usize>> {
        let mut terms = Vec::new();
        if n_features == 0 {
            return terms;
        }

        for d in 1..=degree {
            let mut combo = vec![0; d];
            loop {
                terms.push(combo.clone());

                // Advance to the next non-decreasing index tuple
                let mut i = d;
                while i > 0 && combo[i - 1] == n_features - 1 {
                    i -= 1;
                }
                if i == 0 {
                    break;
                }
                combo[i - 1] += 1;
                let v = combo[i - 1];
                for slot in combo.iter_mut().skip(i) {
                    *slot = v;
                }
            }
        }
        terms
    }

    /// Expand features to polynomial terms
    fn expand_features(x: &Array2<f64>, terms: &[Vec<usize>]) -> Array2<f64> {
        let mut result = Array2::ones((x.nrows(), terms.len()));
        for (j, term) in terms.iter().enumerate() {
            let mut col = result.column_mut(j);
            for &feature in term {
                col *= &x.column(feature);
            }
        }
        result
    }

    pub fn is_fitted(&self) -> bool {
        self.inner.is_fitted()
    }
}

impl RegressionEngine for PolynomialRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;
        self.n_original_features = x.ncols();
        self.terms = Self::monomials(x.ncols(), self.degree);
        let x_poly = Self::expand_features(x, &self.terms);
        self.inner.fit(&x_poly, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted() {
            return Err(PredictorError::ModelNotFitted);
        }
        check_n_features(self.n_original_features, x)?;
        let x_poly = Self::expand_features(x, &self.terms);
        self.inner.predict(&x_poly)
    }
}
