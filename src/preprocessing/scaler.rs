//! Min-max feature scaling

use crate::error::{PredictorError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// When predict-time inputs are scaled, where the bounds come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleMode {
    /// Recompute bounds from every batch, at train and at predict time
    #[default]
    PerBatch,
    /// Learn bounds at train time and reuse them for predictions
    TrainBounds,
}

/// Per-column min-max scaler mapping each feature into [0, 1].
///
/// Constant columns have their range replaced by 1, so they map to 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MinMaxScaler {
    /// Column minimums
    center: Option<Array1<f64>>,
    /// Column ranges
    scale: Option<Array1<f64>>,
}

impl MinMaxScaler {
    /// Create a new, unfitted scaler
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn column bounds from `x`
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        let n_features = x.ncols();
        if x.nrows() == 0 {
            self.center = Some(Array1::zeros(n_features));
            self.scale = Some(Array1::ones(n_features));
            return Ok(self);
        }

        let min = x.fold_axis(Axis(0), f64::INFINITY, |acc, &v| acc.min(v));
        let max = x.fold_axis(Axis(0), f64::NEG_INFINITY, |acc, &v| acc.max(v));
        let range = &max - &min;

        self.scale = Some(range.mapv(|r| if r == 0.0 { 1.0 } else { r }));
        self.center = Some(min);
        Ok(self)
    }

    /// Rescale `x` with the learned bounds
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (center, scale) = match (&self.center, &self.scale) {
            (Some(center), Some(scale)) => (center, scale),
            _ => return Err(PredictorError::ModelNotFitted),
        };

        if x.ncols() != center.len() {
            return Err(PredictorError::ShapeError {
                expected: format!("{} features", center.len()),
                actual: format!("{} features", x.ncols()),
            });
        }

        Ok((x - &center.view().insert_axis(Axis(0))) / &scale.view().insert_axis(Axis(0)))
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    pub fn is_fitted(&self) -> bool {
        self.center.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_minmax_scaler() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 40.0]];
        let scaled = MinMaxScaler::new().fit_transform(&x).unwrap();

        assert_eq!(scaled.column(0).to_vec(), vec![0.0, 0.5, 1.0]);
        assert!((scaled[[1, 1]] - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(scaled[[2, 1]], 1.0);
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let x = array![[1.0, 5.0], [1.0, 7.0]];
        let scaled = MinMaxScaler::new().fit_transform(&x).unwrap();
        assert_eq!(scaled.column(0).to_vec(), vec![0.0, 0.0]);

        // A single row collapses every column
        let single = array![[1.0, 1.0]];
        let scaled = MinMaxScaler::new().fit_transform(&single).unwrap();
        assert_eq!(scaled, array![[0.0, 0.0]]);
    }

    #[test]
    fn test_transform_reuses_fitted_bounds() {
        let mut scaler = MinMaxScaler::new();
        scaler.fit(&array![[0.0, 0.0], [2.0, 2.0]]).unwrap();
        let scaled = scaler.transform(&array![[1.0, 1.0]]).unwrap();
        assert_eq!(scaled, array![[0.5, 0.5]]);
    }

    #[test]
    fn test_transform_unfitted_or_mismatched() {
        let scaler = MinMaxScaler::new();
        assert!(matches!(
            scaler.transform(&array![[1.0]]),
            Err(PredictorError::ModelNotFitted)
        ));

        let mut scaler = MinMaxScaler::new();
        scaler.fit(&array![[1.0, 2.0]]).unwrap();
        assert!(matches!(
            scaler.transform(&array![[1.0]]),
            Err(PredictorError::ShapeError { .. })
        ));
    }
}
