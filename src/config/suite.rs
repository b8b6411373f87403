//! JSON files consumed by the command-line interface

use super::params::RawConfig;
use crate::error::{PredictorError, Result};
use crate::predictor::{Predictor, PredictorKind};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// The predictor section of an experiment configuration.
///
/// Other top-level sections of the experiment file are ignored, so a full
/// experiment description can be passed as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictorSuite {
    /// One entry per predictor type; `name` selects the type
    pub predictor: Vec<RawConfig>,
}

impl PredictorSuite {
    /// Load a suite from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let suite = Self::from_json(&contents)?;
        info!(path = %path.display(), entries = suite.predictor.len(), "Loaded predictor suite");
        Ok(suite)
    }

    /// Parse a suite from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PredictorError::Config(e.to_string()))
    }

    /// Resolve every entry's predictor type, failing on the first unknown or
    /// missing name.
    pub fn kinds(&self) -> Result<Vec<PredictorKind>> {
        self.predictor
            .iter()
            .enumerate()
            .map(|(idx, raw)| {
                let name = raw.name.as_deref().ok_or_else(|| {
                    PredictorError::Config(format!("predictor entry {} has no 'name'", idx))
                })?;
                PredictorKind::from_name(name)
            })
            .collect()
    }

    /// Generate all predictor instances, entries in file order
    pub fn generate(&self) -> Result<Vec<Predictor>> {
        let kinds = self.kinds()?;
        let mut predictors = Vec::new();
        for (kind, raw) in kinds.into_iter().zip(&self.predictor) {
            predictors.extend(Predictor::generate(kind, raw)?);
        }
        Ok(predictors)
    }
}

/// Feature matrix with an optional parallel response vector
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub features: Vec<Vec<f64>>,
    #[serde(default)]
    pub responses: Vec<f64>,
}

impl Dataset {
    /// Load a dataset from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Feature rows as a matrix; all rows must have the same width
    pub fn features(&self) -> Result<Array2<f64>> {
        let n_rows = self.features.len();
        let n_cols = self.features.first().map_or(0, |row| row.len());

        if let Some((idx, row)) = self
            .features
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != n_cols)
        {
            return Err(PredictorError::ShapeError {
                expected: format!("{} features per row", n_cols),
                actual: format!("{} features in row {}", row.len(), idx),
            });
        }

        let flat: Vec<f64> = self.features.iter().flatten().copied().collect();
        Ok(Array2::from_shape_vec((n_rows, n_cols), flat)?)
    }

    /// Responses as a vector; must match the number of feature rows
    pub fn responses(&self) -> Result<Array1<f64>> {
        if self.responses.len() != self.features.len() {
            return Err(PredictorError::ShapeError {
                expected: format!("{} responses", self.features.len()),
                actual: format!("{} responses", self.responses.len()),
            });
        }
        Ok(Array1::from_vec(self.responses.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suite_from_json_ignores_other_sections() {
        let suite = PredictorSuite::from_json(
            r#"{
                "name": "example experiment",
                "repetitions": 3,
                "predictor": [
                    {"name": "PolynomialRegressionPredictor", "degree": [1, 2]},
                    {"name": "RidgeRegressionPredictor", "alpha": 0.5}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(suite.predictor.len(), 2);
        assert_eq!(
            suite.kinds().unwrap(),
            vec![PredictorKind::PolynomialRegression, PredictorKind::RidgeRegression]
        );
        assert_eq!(suite.generate().unwrap().len(), 3);
    }

    #[test]
    fn test_suite_requires_names() {
        let suite = PredictorSuite::from_json(r#"{"predictor": [{"degree": 2}]}"#).unwrap();
        assert!(matches!(suite.kinds(), Err(PredictorError::Config(_))));

        let suite =
            PredictorSuite::from_json(r#"{"predictor": [{"name": "KernelRidgePredictor"}]}"#).unwrap();
        assert!(matches!(suite.generate(), Err(PredictorError::NotImplemented(_))));
    }

    #[test]
    fn test_dataset_arrays() {
        let data: Dataset =
            serde_json::from_str(r#"{"features": [[0.0, 0.0], [2.0, 2.0]], "responses": [0.5, 2.5]}"#)
                .unwrap();
        let x = data.features().unwrap();
        assert_eq!(x.dim(), (2, 2));
        assert_eq!(x[[1, 0]], 2.0);
        assert_eq!(data.responses().unwrap().len(), 2);
    }

    #[test]
    fn test_dataset_ragged_rows() {
        let data = Dataset {
            features: vec![vec![1.0, 2.0], vec![3.0]],
            responses: vec![1.0, 2.0],
        };
        assert!(matches!(data.features(), Err(PredictorError::ShapeError { .. })));
    }

    #[test]
    fn test_dataset_without_responses() {
        let data: Dataset = serde_json::from_str(r#"{"features": [[1.0, 1.0]]}"#).unwrap();
        assert!(data.features().is_ok());
        assert!(data.responses().is_err());
    }
}
