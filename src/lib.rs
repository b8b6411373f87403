//! # perfpredict
//!
//! A factory for parameterized regression predictors used in performance
//! prediction experiments.
//!
//! ## Features
//!
//! - **Sweeps**: `degree` and `epsilon` accept a scalar, a list or a
//!   `{min, max, step}` range; one predictor is generated per combination
//! - **Predictors**: polynomial, SVR (RBF, linear, polynomial kernels),
//!   decision tree, Lasso, LassoLars, ElasticNet, Ridge and SGD regression
//! - **Scaling**: optional min-max scaling of inputs before training and prediction
//! - **Results**: flat, serializable result records with deterministic
//!   short configuration identifiers
//!
//! ## Example
//!
//! ```no_run
//! use perfpredict::prelude::*;
//! use ndarray::array;
//!
//! let raw = RawConfig::new().with_degree(ParamSpec::list([1i64, 2, 3]));
//! let mut predictors = Predictor::generate(PredictorKind::PolynomialRegression, &raw)?;
//!
//! let x = array![[0.0], [1.0], [2.0], [3.0]];
//! let y = array![1.0, 2.0, 5.0, 10.0];
//! for outcome in train_all(&mut predictors, &x, &y) {
//!     outcome?;
//! }
//! let predictions = predictors[0].predict(&x)?;
//! # Ok::<(), perfpredict::PredictorError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod predictor;
pub mod preprocessing;
pub mod training;

pub use error::{PredictorError, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{ParamSpec, PredictorParams, PredictorSuite, RawConfig};
    pub use crate::error::{PredictorError, Result};
    pub use crate::predictor::{train_all, Predictor, PredictorKind, ResultRecord};
    pub use crate::preprocessing::ScaleMode;
    pub use crate::training::RegressionEngine;
}
