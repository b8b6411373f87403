//! Engine construction and dispatch per predictor kind

use super::kind::PredictorKind;
use crate::config::PredictorParams;
use crate::error::Result;
use crate::training::{
    DecisionTree, ElasticNetRegression, KernelType, LassoLars, LassoRegression,
    PolynomialRegression, RegressionEngine, RidgeRegression, SGDConfig, SGDRegressor, SVMConfig,
    SVMRegressor,
};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Mixing ratio of the elastic-net penalty
const ELASTIC_NET_L1_RATIO: f64 = 0.5;

/// The regression engine owned by one predictor instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Engine {
    Polynomial(PolynomialRegression),
    Svr(SVMRegressor),
    DecisionTree(DecisionTree),
    Lasso(LassoRegression),
    LassoLars(LassoLars),
    ElasticNet(ElasticNetRegression),
    Ridge(RidgeRegression),
    Sgd(SGDRegressor),
}

impl Engine {
    /// Build the unfitted engine for `kind` from its resolved parameters
    pub fn build(kind: PredictorKind, params: &PredictorParams) -> Self {
        let svr = |kernel: KernelType| {
            let config = SVMConfig::default()
                .with_kernel(kernel)
                .with_epsilon(params.epsilon.as_f64());
            Engine::Svr(SVMRegressor::new(config))
        };

        match kind {
            PredictorKind::PolynomialRegression => {
                Engine::Polynomial(PolynomialRegression::new(params.degree as usize))
            }
            PredictorKind::SupportVectorRegression | PredictorKind::SvrRbfKernel => {
                svr(KernelType::RBF { gamma: None })
            }
            PredictorKind::SvrLinearKernel => svr(KernelType::Linear),
            PredictorKind::SvrPolyKernel => svr(KernelType::polynomial(params.degree)),
            PredictorKind::DecisionTreeRegression => Engine::DecisionTree(
                DecisionTree::new_regressor().with_max_depth(params.max_tree_depth),
            ),
            PredictorKind::LassoRegression => Engine::Lasso(LassoRegression::new(params.alpha)),
            PredictorKind::LassoLarsRegression => Engine::LassoLars(LassoLars::new(params.alpha)),
            PredictorKind::ElasticNetRegression => Engine::ElasticNet(
                ElasticNetRegression::new(params.alpha).with_l1_ratio(ELASTIC_NET_L1_RATIO),
            ),
            PredictorKind::RidgeRegression => Engine::Ridge(RidgeRegression::new(params.alpha)),
            PredictorKind::SgdRegression => Engine::Sgd(SGDRegressor::new(
                SGDConfig::default().with_alpha(params.alpha),
            )),
        }
    }

    fn as_dyn(&self) -> &dyn RegressionEngine {
        match self {
            Engine::Polynomial(m) => m,
            Engine::Svr(m) => m,
            Engine::DecisionTree(m) => m,
            Engine::Lasso(m) => m,
            Engine::LassoLars(m) => m,
            Engine::ElasticNet(m) => m,
            Engine::Ridge(m) => m,
            Engine::Sgd(m) => m,
        }
    }

    fn as_dyn_mut(&mut self) -> &mut dyn RegressionEngine {
        match self {
            Engine::Polynomial(m) => m,
            Engine::Svr(m) => m,
            Engine::DecisionTree(m) => m,
            Engine::Lasso(m) => m,
            Engine::LassoLars(m) => m,
            Engine::ElasticNet(m) => m,
            Engine::Ridge(m) => m,
            Engine::Sgd(m) => m,
        }
    }
}

impl RegressionEngine for Engine {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.as_dyn_mut().fit(x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.as_dyn().predict(x)
    }

    fn reinitialize(&mut self, repetition_id: usize) {
        self.as_dyn_mut().reinitialize(repetition_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_matches_kind() {
        let params = PredictorParams::default();
        for kind in PredictorKind::ALL {
            let engine = Engine::build(kind, &params);
            let ok = match kind {
                PredictorKind::PolynomialRegression => matches!(engine, Engine::Polynomial(_)),
                PredictorKind::SupportVectorRegression
                | PredictorKind::SvrRbfKernel
                | PredictorKind::SvrLinearKernel
                | PredictorKind::SvrPolyKernel => matches!(engine, Engine::Svr(_)),
                PredictorKind::DecisionTreeRegression => matches!(engine, Engine::DecisionTree(_)),
                PredictorKind::LassoRegression => matches!(engine, Engine::Lasso(_)),
                PredictorKind::LassoLarsRegression => matches!(engine, Engine::LassoLars(_)),
                PredictorKind::ElasticNetRegression => matches!(engine, Engine::ElasticNet(_)),
                PredictorKind::RidgeRegression => matches!(engine, Engine::Ridge(_)),
                PredictorKind::SgdRegression => matches!(engine, Engine::Sgd(_)),
            };
            assert!(ok, "{} built {:?}", kind, engine);
        }
    }

    #[test]
    fn test_parameters_reach_engines() {
        let params = PredictorParams::default()
            .with_degree(3)
            .with_epsilon(0.25)
            .with_max_tree_depth(4)
            .with_alpha(0.7);

        match Engine::build(PredictorKind::SvrPolyKernel, &params) {
            Engine::Svr(m) => {
                assert_eq!(m.config().epsilon, 0.25);
                assert_eq!(m.config().kernel, KernelType::polynomial(3));
            }
            other => panic!("unexpected engine {:?}", other),
        }
        match Engine::build(PredictorKind::DecisionTreeRegression, &params) {
            Engine::DecisionTree(m) => assert_eq!(m.max_depth, Some(4)),
            other => panic!("unexpected engine {:?}", other),
        }
        match Engine::build(PredictorKind::ElasticNetRegression, &params) {
            Engine::ElasticNet(m) => {
                assert_eq!(m.alpha, 0.7);
                assert_eq!(m.l1_ratio, 0.5);
            }
            other => panic!("unexpected engine {:?}", other),
        }
        match Engine::build(PredictorKind::SgdRegression, &params) {
            Engine::Sgd(m) => assert_eq!(m.config.alpha, 0.7),
            other => panic!("unexpected engine {:?}", other),
        }
    }
}
