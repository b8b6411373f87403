//! Raw and resolved predictor configurations

use super::expand::{ParamSpec, ParamValue};
use crate::error::{PredictorError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DEGREE: i64 = 2;
pub const DEFAULT_EPSILON: f64 = 0.1;
pub const DEFAULT_MAX_TREE_DEPTH: usize = 2;
pub const DEFAULT_ALPHA: f64 = 0.1;
/// Normalize inputs to [0, 1] before training and prediction
pub const DEFAULT_SCALE_X: bool = true;

/// Configuration for one predictor type as supplied by the experiment harness.
///
/// `degree` and `epsilon` may be sweeps; every other field is single-valued.
/// Unknown fields are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// Polynomial degree (polynomial regression, polynomial SVR kernel)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<ParamSpec>,

    /// SVR tube width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epsilon: Option<ParamSpec>,

    /// Maximum depth of the decision tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tree_depth: Option<usize>,

    /// Regularization strength of the linear models
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,

    /// Min-max scale the feature matrix before training and prediction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<bool>,

    /// Predictor type name, when the configuration comes from a suite file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RawConfig {
    /// Create an empty configuration (all defaults)
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PredictorError::Config(e.to_string()))
    }

    pub fn with_degree(mut self, degree: impl Into<ParamSpec>) -> Self {
        self.degree = Some(degree.into());
        self
    }

    pub fn with_epsilon(mut self, epsilon: impl Into<ParamSpec>) -> Self {
        self.epsilon = Some(epsilon.into());
        self
    }

    pub fn with_max_tree_depth(mut self, depth: usize) -> Self {
        self.max_tree_depth = Some(depth);
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub fn with_scale_x(mut self, scale_x: bool) -> Self {
        self.scale_x = Some(scale_x);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Concrete configuration of one predictor instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorParams {
    pub degree: u32,
    /// Kept as configured, so an integer epsilon reports as an integer
    pub epsilon: ParamValue,
    pub max_tree_depth: usize,
    pub alpha: f64,
    pub scale_x: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Default for PredictorParams {
    fn default() -> Self {
        Self {
            degree: DEFAULT_DEGREE as u32,
            epsilon: ParamValue::Float(DEFAULT_EPSILON),
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
            alpha: DEFAULT_ALPHA,
            scale_x: DEFAULT_SCALE_X,
            name: None,
        }
    }
}

impl PredictorParams {
    /// Merge one point of a sweep with the single-valued fields of `raw`,
    /// defaulting everything that is absent.
    pub fn resolve(
        raw: &RawConfig,
        degree: Option<ParamValue>,
        epsilon: Option<ParamValue>,
    ) -> Result<Self> {
        let defaults = Self::default();
        let params = Self {
            degree: match degree {
                Some(value) => Self::degree_from(value)?,
                None => defaults.degree,
            },
            epsilon: epsilon.unwrap_or(defaults.epsilon),
            max_tree_depth: raw.max_tree_depth.unwrap_or(defaults.max_tree_depth),
            alpha: raw.alpha.unwrap_or(defaults.alpha),
            scale_x: raw.scale_x.unwrap_or(defaults.scale_x),
            name: raw.name.clone(),
        };
        params.validate()?;
        Ok(params)
    }

    fn degree_from(value: ParamValue) -> Result<u32> {
        value
            .as_i64()
            .and_then(|d| u32::try_from(d).ok())
            .ok_or_else(|| PredictorError::InvalidParameter {
                name: "degree".to_string(),
                value: value.to_string(),
                reason: "must be a non-negative integer".to_string(),
            })
    }

    pub fn with_degree(mut self, degree: u32) -> Self {
        self.degree = degree;
        self
    }

    pub fn with_epsilon(mut self, epsilon: impl Into<ParamValue>) -> Self {
        self.epsilon = epsilon.into();
        self
    }

    pub fn with_max_tree_depth(mut self, depth: usize) -> Self {
        self.max_tree_depth = depth;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_scale_x(mut self, scale_x: bool) -> Self {
        self.scale_x = scale_x;
        self
    }

    /// Check value ranges every engine relies on
    pub fn validate(&self) -> Result<()> {
        if self.degree == 0 {
            return Err(invalid("degree", self.degree, "must be at least 1"));
        }
        let epsilon = self.epsilon.as_f64();
        if !(epsilon.is_finite() && epsilon >= 0.0) {
            return Err(invalid("epsilon", self.epsilon, "must be finite and non-negative"));
        }
        if self.max_tree_depth == 0 {
            return Err(invalid("max_tree_depth", self.max_tree_depth, "must be at least 1"));
        }
        if !(self.alpha.is_finite() && self.alpha >= 0.0) {
            return Err(invalid("alpha", self.alpha, "must be finite and non-negative"));
        }
        Ok(())
    }
}

fn invalid(name: &str, value: impl ToString, reason: &str) -> PredictorError {
    PredictorError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = PredictorParams::default();
        assert_eq!(params.degree, 2);
        assert_eq!(params.epsilon, ParamValue::Float(0.1));
        assert_eq!(params.max_tree_depth, 2);
        assert_eq!(params.alpha, 0.1);
        assert!(params.scale_x);
        assert!(params.name.is_none());
    }

    #[test]
    fn test_resolve_merges_overrides() {
        let raw = RawConfig::new().with_alpha(0.5).with_scale_x(false);
        let params =
            PredictorParams::resolve(&raw, Some(ParamValue::Int(3)), Some(ParamValue::Float(0.2)))
                .unwrap();
        assert_eq!(params.degree, 3);
        assert_eq!(params.epsilon, ParamValue::Float(0.2));
        assert_eq!(params.alpha, 0.5);
        assert!(!params.scale_x);
        assert_eq!(params.max_tree_depth, DEFAULT_MAX_TREE_DEPTH);
    }

    #[test]
    fn test_resolve_rejects_fractional_degree() {
        let err = PredictorParams::resolve(&RawConfig::new(), Some(ParamValue::Float(2.5)), None)
            .unwrap_err();
        assert!(matches!(err, PredictorError::InvalidParameter { .. }));

        let params =
            PredictorParams::resolve(&RawConfig::new(), Some(ParamValue::Float(4.0)), None).unwrap();
        assert_eq!(params.degree, 4);
    }

    #[test]
    fn test_validate() {
        assert!(PredictorParams::default().with_degree(0).validate().is_err());
        assert!(PredictorParams::default().with_alpha(-1.0).validate().is_err());
        assert!(PredictorParams::default().with_epsilon(f64::NAN).validate().is_err());
        assert!(PredictorParams::default().with_max_tree_depth(0).validate().is_err());
    }

    #[test]
    fn test_raw_config_rejects_unknown_fields() {
        let err = RawConfig::from_json(r#"{"degree": 2, "gamma": 0.5}"#).unwrap_err();
        match err {
            PredictorError::Config(msg) => assert!(msg.contains("gamma")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_raw_config_from_json() {
        let raw = RawConfig::from_json(
            r#"{"degree": {"min": 1, "max": 3, "step": 1}, "epsilon": [0.1, 0.2], "scale_x": false}"#,
        )
        .unwrap();
        assert_eq!(raw.degree, Some(ParamSpec::range(1, 3, 1)));
        assert_eq!(raw.epsilon, Some(ParamSpec::list([0.1, 0.2])));
        assert_eq!(raw.scale_x, Some(false));
        assert!(raw.alpha.is_none());
    }
}
