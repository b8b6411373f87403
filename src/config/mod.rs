//! Predictor configuration
//!
//! - [`ParamSpec`] / [`expand`] - hyperparameter sweep specifications and their expansion
//! - [`RawConfig`] - configuration for one predictor type as supplied by the harness
//! - [`PredictorParams`] - the concrete, defaulted configuration of one predictor instance
//! - [`PredictorSuite`] / [`Dataset`] - JSON files consumed by the command-line interface

mod expand;
mod params;
mod suite;

pub use expand::{expand, ParamSpec, ParamValue, RangeSpec};
pub use params::{
    PredictorParams, RawConfig, DEFAULT_ALPHA, DEFAULT_DEGREE, DEFAULT_EPSILON,
    DEFAULT_MAX_TREE_DEPTH, DEFAULT_SCALE_X,
};
pub use suite::{Dataset, PredictorSuite};
