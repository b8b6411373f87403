//! The capability shared by all regression engines

use crate::error::{PredictorError, Result};
use ndarray::{Array1, Array2};

/// A regression algorithm fitted on a feature matrix and a response vector.
///
/// Engines never rescale their inputs and keep only fitted parameters after
/// `fit` returns.
pub trait RegressionEngine: Send + Sync {
    /// Fit the engine to training data, replacing any previous fit
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict one response per row of `x`
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Prepare for a new repetition of an experiment
    fn reinitialize(&mut self, _repetition_id: usize) {}

    /// Coefficient of determination on `(x, y)`
    fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let y_pred = self.predict(x)?;
        Ok(r2_score(y, &y_pred))
    }
}

/// R² of `y_pred` against `y_true`; 1 when `y_true` is constant
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let y_mean = y_true.mean().unwrap_or(0.0);
    let ss_res = (y_pred - y_true).mapv(|v| v * v).sum();
    let ss_tot = y_true.mapv(|v| (v - y_mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return 1.0;
    }
    1.0 - ss_res / ss_tot
}

/// Fail unless `x` has one row per response and all values are finite
pub(crate) fn check_fit_shapes(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(PredictorError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    if x.nrows() == 0 {
        return Err(PredictorError::ShapeError {
            expected: "at least one training sample".to_string(),
            actual: "0 samples".to_string(),
        });
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(PredictorError::ComputationError(
            "training data contains NaN or infinite values".to_string(),
        ));
    }
    Ok(())
}

/// Fail unless `x` has the number of columns seen during fit
pub(crate) fn check_n_features(expected: usize, x: &Array2<f64>) -> Result<()> {
    if x.ncols() != expected {
        return Err(PredictorError::ShapeError {
            expected: format!("{} features", expected),
            actual: format!("{} features", x.ncols()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_r2_score() {
        let y_true = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y_pred = array![1.1, 2.0, 2.9, 4.1, 5.0];
        assert!(r2_score(&y_true, &y_pred) > 0.9);
        assert_eq!(r2_score(&array![2.0, 2.0], &array![1.0, 3.0]), 1.0);
    }

    #[test]
    fn test_shape_checks() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        assert!(check_fit_shapes(&x, &array![1.0, 2.0]).is_ok());
        assert!(check_fit_shapes(&x, &array![1.0]).is_err());
        assert!(check_n_features(2, &x).is_ok());
        assert!(check_n_features(3, &x).is_err());
    }

    #[test]
    fn test_fit_rejects_non_finite() {
        let x = array![[1.0, f64::NAN], [3.0, 4.0]];
        assert!(matches!(
            check_fit_shapes(&x, &array![1.0, 2.0]),
            Err(PredictorError::ComputationError(_))
        ));

        let x = array![[1.0, 2.0], [3.0, 4.0]];
        assert!(matches!(
            check_fit_shapes(&x, &array![1.0, f64::INFINITY]),
            Err(PredictorError::ComputationError(_))
        ));
    }
}
