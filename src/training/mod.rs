//! Regression engines
//!
//! Pure-Rust implementations on `ndarray`, one per supported model type:
//! - Linear models (OLS, Ridge, Lasso, ElasticNet, Polynomial)
//! - LassoLars (least-angle regression with the lasso modification)
//! - Support Vector Regression (SMO)
//! - Decision tree regressor
//! - Stochastic Gradient Descent (SGD)
//!
//! Every engine implements [`RegressionEngine`].

mod linalg;
mod models;
pub mod decision_tree;
pub mod lars;
pub mod linear_models;
pub mod sgd;
pub mod svm;

pub use decision_tree::{DecisionTree, TreeNode};
pub use lars::LassoLars;
pub use linear_models::{
    ElasticNetRegression, LassoRegression, LinearRegression, PolynomialRegression, RidgeRegression,
};
pub use models::{r2_score, RegressionEngine};
pub use sgd::{SGDConfig, SGDRegressor};
pub use svm::{KernelType, SVMConfig, SVMRegressor};
