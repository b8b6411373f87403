//! Hyperparameter specifications and their expansion into concrete values

use crate::error::{PredictorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// A single numeric hyperparameter value.
///
/// Integers and floats are kept apart so that reports render values the way
/// they were configured (`2` stays `2`, `0.1` stays `0.1`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
}

impl ParamValue {
    /// Value as float
    pub fn as_f64(&self) -> f64 {
        match self {
            ParamValue::Int(v) => *v as f64,
            ParamValue::Float(v) => *v,
        }
    }

    /// Value as integer, if it has no fractional part
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            ParamValue::Float(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

/// Stepped integer range, inclusive of `max`.
///
/// All bounds are optional at the type level so that a missing key is
/// reported by [`RangeSpec::values`] instead of a generic parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<i64>,
}

impl RangeSpec {
    pub fn new(min: i64, max: i64, step: i64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            step: Some(step),
        }
    }

    /// Enumerate `min, min+step, ...` up to and including `max` when reachable
    pub fn values(&self) -> Result<Vec<i64>> {
        let min = self.min.ok_or(PredictorError::MissingRangeBound("min"))?;
        let max = self.max.ok_or(PredictorError::MissingRangeBound("max"))?;
        let step = self.step.ok_or(PredictorError::MissingRangeBound("step"))?;

        if step <= 0 {
            return Err(PredictorError::InvalidParameter {
                name: "step".to_string(),
                value: step.to_string(),
                reason: "range step must be positive".to_string(),
            });
        }

        if min > max {
            warn!(min, max, step, "Range specification expands to no values");
            return Ok(Vec::new());
        }

        Ok((min..=max).step_by(step as usize).collect())
    }
}

/// Hyperparameter specification: a scalar, an explicit list, or a range.
///
/// Anything else deserializes into [`ParamSpec::Other`] and is rejected on
/// expansion with an error naming the offending value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamSpec {
    Value(ParamValue),
    List(Vec<ParamValue>),
    Range(RangeSpec),
    Other(serde_json::Value),
}

impl ParamSpec {
    /// Range specification `{min, max, step}`
    pub fn range(min: i64, max: i64, step: i64) -> Self {
        ParamSpec::Range(RangeSpec::new(min, max, step))
    }

    /// Explicit list of values
    pub fn list<V: Into<ParamValue>>(values: impl IntoIterator<Item = V>) -> Self {
        ParamSpec::List(values.into_iter().map(Into::into).collect())
    }

    /// Expand into the ordered sequence of concrete values
    pub fn expand(&self) -> Result<Vec<ParamValue>> {
        match self {
            ParamSpec::Value(v) => Ok(vec![*v]),
            ParamSpec::List(values) => Ok(values.clone()),
            ParamSpec::Range(range) => Ok(range.values()?.into_iter().map(ParamValue::Int).collect()),
            ParamSpec::Other(value) => Err(PredictorError::UnsupportedSpec(value.to_string())),
        }
    }
}

impl From<i64> for ParamSpec {
    fn from(v: i64) -> Self {
        ParamSpec::Value(ParamValue::Int(v))
    }
}

impl From<f64> for ParamSpec {
    fn from(v: f64) -> Self {
        ParamSpec::Value(ParamValue::Float(v))
    }
}

impl From<RangeSpec> for ParamSpec {
    fn from(range: RangeSpec) -> Self {
        ParamSpec::Range(range)
    }
}

/// Expand an optional specification.
///
/// An absent specification expands to `[None]`, leaving the field to its
/// default when the predictor is constructed.
pub fn expand(spec: Option<&ParamSpec>) -> Result<Vec<Option<ParamValue>>> {
    match spec {
        None => Ok(vec![None]),
        Some(spec) => Ok(spec.expand()?.into_iter().map(Some).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ParamSpec {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_expand_scalar() {
        assert_eq!(parse("2").expand().unwrap(), vec![ParamValue::Int(2)]);
        assert_eq!(parse("0.1").expand().unwrap(), vec![ParamValue::Float(0.1)]);
    }

    #[test]
    fn test_expand_list_unchanged() {
        let values = parse("[3, 1, 0.5]").expand().unwrap();
        assert_eq!(
            values,
            vec![ParamValue::Int(3), ParamValue::Int(1), ParamValue::Float(0.5)]
        );
    }

    #[test]
    fn test_expand_range_inclusive() {
        let values = parse(r#"{"min": 1, "max": 5, "step": 2}"#).expand().unwrap();
        assert_eq!(
            values,
            vec![ParamValue::Int(1), ParamValue::Int(3), ParamValue::Int(5)]
        );

        let values = ParamSpec::range(1, 6, 2).expand().unwrap();
        assert_eq!(
            values,
            vec![ParamValue::Int(1), ParamValue::Int(3), ParamValue::Int(5)]
        );
    }

    #[test]
    fn test_expand_range_missing_bound() {
        let err = parse(r#"{"min": 1, "max": 5}"#).expand().unwrap_err();
        assert!(matches!(err, PredictorError::MissingRangeBound("step")));

        let err = parse(r#"{"max": 5, "step": 1}"#).expand().unwrap_err();
        assert!(matches!(err, PredictorError::MissingRangeBound("min")));

        let err = parse("{}").expand().unwrap_err();
        assert!(err.is_specification_error());
    }

    #[test]
    fn test_expand_range_invalid_step() {
        let err = ParamSpec::range(1, 5, 0).expand().unwrap_err();
        assert!(matches!(err, PredictorError::InvalidParameter { .. }));
    }

    #[test]
    fn test_expand_range_empty_when_min_exceeds_max() {
        assert!(ParamSpec::range(5, 1, 1).expand().unwrap().is_empty());
    }

    #[test]
    fn test_expand_unsupported_shape() {
        let err = parse(r#""two""#).expand().unwrap_err();
        match err {
            PredictorError::UnsupportedSpec(value) => assert!(value.contains("two")),
            other => panic!("unexpected error: {other:?}"),
        }

        // Float bounds are not supported for ranges
        let err = parse(r#"{"min": 0.1, "max": 0.5, "step": 0.1}"#).expand().unwrap_err();
        assert!(matches!(err, PredictorError::UnsupportedSpec(_)));
    }

    #[test]
    fn test_expand_absent() {
        assert_eq!(expand(None).unwrap(), vec![None]);
        let spec = ParamSpec::list([1i64, 2]);
        assert_eq!(
            expand(Some(&spec)).unwrap(),
            vec![Some(ParamValue::Int(1)), Some(ParamValue::Int(2))]
        );
    }

    #[test]
    fn test_param_value_display() {
        assert_eq!(ParamValue::Int(2).to_string(), "2");
        assert_eq!(ParamValue::Float(0.1).to_string(), "0.1");
        assert_eq!(ParamValue::Float(1.0).to_string(), "1.0");
        assert_eq!(ParamValue::Float(3.0).as_i64(), Some(3));
        assert_eq!(ParamValue::Float(2.5).as_i64(), None);
    }
}
