//! Registry of supported predictor types

use crate::error::{PredictorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of predictor types, addressed by their registry name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PredictorKind {
    /// Polynomial features + least squares
    PolynomialRegression,
    /// Epsilon-SVR with RBF kernel
    SupportVectorRegression,
    SvrRbfKernel,
    SvrLinearKernel,
    /// Epsilon-SVR with polynomial kernel of `degree`
    SvrPolyKernel,
    DecisionTreeRegression,
    LassoRegression,
    LassoLarsRegression,
    ElasticNetRegression,
    RidgeRegression,
    SgdRegression,
}

impl PredictorKind {
    /// All registered kinds
    pub const ALL: [PredictorKind; 11] = [
        PredictorKind::PolynomialRegression,
        PredictorKind::SupportVectorRegression,
        PredictorKind::SvrRbfKernel,
        PredictorKind::SvrLinearKernel,
        PredictorKind::SvrPolyKernel,
        PredictorKind::DecisionTreeRegression,
        PredictorKind::LassoRegression,
        PredictorKind::LassoLarsRegression,
        PredictorKind::ElasticNetRegression,
        PredictorKind::RidgeRegression,
        PredictorKind::SgdRegression,
    ];

    /// Registry name of this kind
    pub fn name(&self) -> &'static str {
        match self {
            PredictorKind::PolynomialRegression => "PolynomialRegressionPredictor",
            PredictorKind::SupportVectorRegression => "SupportVectorRegressionPredictor",
            PredictorKind::SvrRbfKernel => "SVRPredictorRbfKernel",
            PredictorKind::SvrLinearKernel => "SVRPredictorLinearKernel",
            PredictorKind::SvrPolyKernel => "SVRPredictorPolyKernel",
            PredictorKind::DecisionTreeRegression => "DecisionTreeRegressionPredictor",
            PredictorKind::LassoRegression => "LassoRegressionPredictor",
            PredictorKind::LassoLarsRegression => "LassoLARSRegressionPredictor",
            PredictorKind::ElasticNetRegression => "ElasticNetRegressionPredictor",
            PredictorKind::RidgeRegression => "RidgeRegressionPredictor",
            PredictorKind::SgdRegression => "SGDRegressionPredictor",
        }
    }

    /// Fixed abbreviation used in result records
    pub fn short_name(&self) -> &'static str {
        match self {
            PredictorKind::PolynomialRegression => "PRP",
            PredictorKind::SupportVectorRegression => "SVRP",
            PredictorKind::SvrRbfKernel => "SVRPRK",
            PredictorKind::SvrLinearKernel => "SVRPLK",
            PredictorKind::SvrPolyKernel => "SVRPPK",
            PredictorKind::DecisionTreeRegression => "DTRP",
            PredictorKind::LassoRegression => "LRP",
            PredictorKind::LassoLarsRegression => "LLARSRP",
            PredictorKind::ElasticNetRegression => "ENRP",
            PredictorKind::RidgeRegression => "RRP",
            PredictorKind::SgdRegression => "SGDRP",
        }
    }

    /// Look up a kind by its exact, case-sensitive registry name
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| PredictorError::NotImplemented(name.to_string()))
    }
}

impl FromStr for PredictorKind {
    type Err = PredictorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl fmt::Display for PredictorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_name_roundtrip() {
        for kind in PredictorKind::ALL {
            assert_eq!(PredictorKind::from_name(kind.name()).unwrap(), kind);
            assert_eq!(kind.name().parse::<PredictorKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_short_names_are_uppercase_letters_of_name() {
        for kind in PredictorKind::ALL {
            let letters: String = kind.name().chars().filter(|c| c.is_ascii_uppercase()).collect();
            assert_eq!(kind.short_name(), letters);
        }
        assert_eq!(PredictorKind::PolynomialRegression.short_name(), "PRP");
    }

    #[test]
    fn test_short_names_unique() {
        let names: HashSet<_> = PredictorKind::ALL.iter().map(|k| k.short_name()).collect();
        assert_eq!(names.len(), PredictorKind::ALL.len());
    }

    #[test]
    fn test_unknown_name() {
        let err = PredictorKind::from_name("GaussianProcessPredictor").unwrap_err();
        assert!(matches!(err, PredictorError::NotImplemented(_)));
        assert!(err.to_string().contains("GaussianProcessPredictor"));

        // Matching is case-sensitive
        assert!(PredictorKind::from_name("ridgeregressionpredictor").is_err());
    }
}
