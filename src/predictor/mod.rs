//! Predictor instances and their generation from configurations
//!
//! A [`Predictor`] couples one resolved [`PredictorParams`] with the
//! regression [`Engine`] of its [`PredictorKind`], and owns the shared
//! lifecycle: optional min-max input scaling, training, prediction,
//! per-repetition reset and result reporting.

mod engine;
mod kind;
mod results;

pub use engine::Engine;
pub use kind::PredictorKind;
pub use results::{abbreviate_key, short_config, ResultRecord};

use crate::config::{expand, PredictorParams, RawConfig};
use crate::error::{PredictorError, Result};
use crate::preprocessing::{MinMaxScaler, ScaleMode};
use crate::training::RegressionEngine;
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// A configured regression model instance
#[derive(Debug, Clone)]
pub struct Predictor {
    kind: PredictorKind,
    params: PredictorParams,
    engine: Engine,
    trained: bool,
    scale_mode: ScaleMode,
    /// Bounds learned from the last training matrix
    train_scaler: MinMaxScaler,
    /// Wall time of the last successful train
    training_time: Option<Duration>,
}

impl Predictor {
    /// Create an untrained predictor from resolved parameters
    pub fn new(kind: PredictorKind, params: PredictorParams) -> Result<Self> {
        params.validate()?;
        let engine = Engine::build(kind, &params);
        let predictor = Self {
            kind,
            params,
            engine,
            trained: false,
            scale_mode: ScaleMode::default(),
            train_scaler: MinMaxScaler::new(),
            training_time: None,
        };
        info!("Initialized predictor: {}", predictor);
        Ok(predictor)
    }

    /// Create a single predictor from a raw configuration.
    ///
    /// `degree` and `epsilon` must not be sweeps; use [`Predictor::generate`]
    /// for those.
    pub fn from_config(kind: PredictorKind, raw: &RawConfig) -> Result<Self> {
        let mut predictors = Self::generate(kind, raw)?;
        if predictors.len() != 1 {
            return Err(PredictorError::Config(format!(
                "configuration for {} expands to {} instances, expected exactly one",
                kind,
                predictors.len()
            )));
        }
        Ok(predictors.remove(0))
    }

    /// Generate one predictor per `(degree, epsilon)` combination.
    ///
    /// Degrees form the outer loop and epsilons the inner loop. All other
    /// fields of `raw` are passed to every instance unchanged.
    pub fn generate(kind: PredictorKind, raw: &RawConfig) -> Result<Vec<Self>> {
        let degrees = expand(raw.degree.as_ref())?;
        let epsilons = expand(raw.epsilon.as_ref())?;

        let mut predictors = Vec::with_capacity(degrees.len() * epsilons.len());
        for degree in &degrees {
            for epsilon in &epsilons {
                let params = PredictorParams::resolve(raw, *degree, *epsilon)?;
                predictors.push(Self::new(kind, params)?);
            }
        }
        Ok(predictors)
    }

    /// Like [`Predictor::generate`], looking the kind up by registry name
    pub fn generate_by_name(name: &str, raw: &RawConfig) -> Result<Vec<Self>> {
        Self::generate(PredictorKind::from_name(name)?, raw)
    }

    /// Select where predict-time scaling bounds come from
    pub fn with_scale_mode(mut self, mode: ScaleMode) -> Self {
        self.scale_mode = mode;
        self
    }

    /// Fit the engine on `features` (rows) and `responses`
    pub fn train(&mut self, features: &Array2<f64>, responses: &Array1<f64>) -> Result<()> {
        self.trained = false;
        self.training_time = None;
        let start = Instant::now();
        let features = if self.params.scale_x {
            self.train_scaler.fit_transform(features)?
        } else {
            features.clone()
        };

        self.engine.fit(&features, responses)?;
        self.trained = true;
        let elapsed = start.elapsed();
        self.training_time = Some(elapsed);
        debug!(
            predictor = %self.short_config(),
            n_samples = features.nrows(),
            n_features = features.ncols(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Trained predictor"
        );
        Ok(())
    }

    /// Predict one response per row of `features`.
    ///
    /// With scaling enabled, [`ScaleMode::PerBatch`] rescales `features` by
    /// its own bounds while [`ScaleMode::TrainBounds`] reuses the bounds of
    /// the training matrix.
    pub fn predict(&self, features: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.trained {
            error!(predictor = %self.short_config(), "Model not trained!");
        }

        if !self.params.scale_x {
            return self.engine.predict(features);
        }

        let scaled = match self.scale_mode {
            ScaleMode::PerBatch => MinMaxScaler::new().fit_transform(features)?,
            ScaleMode::TrainBounds => self.train_scaler.transform(features)?,
        };
        self.engine.predict(&scaled)
    }

    /// Called once per experiment repetition; never fails
    pub fn reinitialize(&mut self, repetition_id: usize) {
        self.engine.reinitialize(repetition_id);
    }

    /// Registry name of the predictor type
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn short_name(&self) -> &'static str {
        self.kind.short_name()
    }

    /// Deterministic identifier of this instance's configuration
    pub fn short_config(&self) -> String {
        short_config(self.kind, &self.params)
    }

    /// Result row for the global result collection, built fresh on each call
    pub fn get_results(&self) -> ResultRecord {
        ResultRecord::new(self.kind, &self.params)
    }

    pub fn kind(&self) -> PredictorKind {
        self.kind
    }

    pub fn params(&self) -> &PredictorParams {
        &self.params
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    /// How long the last successful `train` took, including scaling
    pub fn training_time(&self) -> Option<Duration> {
        self.training_time
    }

    pub fn scale_mode(&self) -> ScaleMode {
        self.scale_mode
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

impl fmt::Display for Predictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.params;
        write!(
            f,
            "{}(alpha={}, degree={}, epsilon={}, max_tree_depth={}, scale_x={}",
            self.name(),
            p.alpha,
            p.degree,
            p.epsilon,
            p.max_tree_depth,
            p.scale_x
        )?;
        if let Some(name) = &p.name {
            write!(f, ", name={}", name)?;
        }
        write!(f, ")")
    }
}

/// Train every predictor on the same data in parallel.
///
/// Each instance is touched by exactly one worker; results are returned in
/// input order.
pub fn train_all(
    predictors: &mut [Predictor],
    features: &Array2<f64>,
    responses: &Array1<f64>,
) -> Vec<Result<()>> {
    predictors
        .par_iter_mut()
        .map(|p| p.train(features, responses))
        .collect()
}
