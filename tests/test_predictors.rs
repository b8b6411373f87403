//! Integration test: predictor lifecycle across every registered type

use ndarray::{array, Array1, Array2};
use perfpredict::prelude::*;

fn two_point_data() -> (Array2<f64>, Array1<f64>) {
    (array![[0.0, 0.0], [2.0, 2.0]], array![0.5, 2.5])
}

fn regression_data() -> (Array2<f64>, Array1<f64>) {
    let n = 24;
    let x = Array2::from_shape_fn((n, 2), |(i, j)| {
        if j == 0 {
            i as f64 * 0.5
        } else {
            ((i * 7) % 11) as f64
        }
    });
    let y = Array1::from_shape_fn(n, |i| 1.0 + 2.0 * x[[i, 0]] - 0.5 * x[[i, 1]]);
    (x, y)
}

fn with_scale_x(kind: PredictorKind, scale_x: bool) -> Predictor {
    Predictor::from_config(kind, &RawConfig::new().with_scale_x(scale_x)).unwrap()
}

#[test]
fn test_every_kind_trains_and_predicts() {
    let (x, y) = regression_data();

    for kind in PredictorKind::ALL {
        let mut predictor = Predictor::from_config(kind, &RawConfig::new()).unwrap();
        let result = predictor.train(&x, &y);
        assert!(result.is_ok(), "{} failed to train: {:?}", kind, result.err());
        assert!(predictor.is_trained());

        let predictions = predictor.predict(&x).unwrap();
        assert_eq!(predictions.len(), x.nrows());
        assert!(
            predictions.iter().all(|p| p.is_finite()),
            "{} produced non-finite predictions",
            kind
        );
        assert!(
            predictions.iter().any(|p| p.abs() > 1e-6),
            "{} predicted all zeros",
            kind
        );
    }
}

#[test]
fn test_polynomial_scaled_prediction() {
    let (x, y) = two_point_data();
    let mut predictor = with_scale_x(PredictorKind::PolynomialRegression, true);
    predictor.train(&x, &y).unwrap();

    let pred = predictor.predict(&array![[1.0, 1.0]]).unwrap();
    assert!((pred[0] - 0.5).abs() < 1e-6, "got {}", pred[0]);
}

#[test]
fn test_polynomial_unscaled_prediction() {
    let (x, y) = two_point_data();
    let mut predictor = with_scale_x(PredictorKind::PolynomialRegression, false);
    predictor.train(&x, &y).unwrap();

    let pred = predictor.predict(&array![[1.0, 1.0]]).unwrap();
    assert!((pred[0] - 1.07142857).abs() < 1e-6, "got {}", pred[0]);
}

#[test]
fn test_support_vector_scaled_prediction() {
    let (x, y) = two_point_data();
    let mut predictor = with_scale_x(PredictorKind::SupportVectorRegression, true);
    predictor.train(&x, &y).unwrap();

    let pred = predictor.predict(&array![[1.0, 1.0]]).unwrap();
    assert!((pred[0] - 0.8678794411).abs() < 1e-6, "got {}", pred[0]);
}

#[test]
fn test_support_vector_unscaled_prediction() {
    let (x, y) = two_point_data();
    let mut predictor = with_scale_x(PredictorKind::SupportVectorRegression, false);
    predictor.train(&x, &y).unwrap();

    let pred = predictor.predict(&array![[1.0, 1.0]]).unwrap();
    assert!((pred[0] - 1.5).abs() < 1e-6, "got {}", pred[0]);
}

#[test]
fn test_train_bounds_keeps_predict_rows_apart() {
    let (x, y) = regression_data();
    let mut predictor = Predictor::from_config(PredictorKind::RidgeRegression, &RawConfig::new())
        .unwrap()
        .with_scale_mode(ScaleMode::TrainBounds);
    predictor.train(&x, &y).unwrap();

    // A single row would collapse to zeros under per-batch scaling
    let single = x.slice(ndarray::s![5..6, ..]).to_owned();
    let batch = predictor.predict(&x).unwrap();
    let alone = predictor.predict(&single).unwrap();
    assert!((alone[0] - batch[5]).abs() < 1e-10);
}

#[test]
fn test_results_exclude_scale_x() {
    for kind in PredictorKind::ALL {
        let predictor = with_scale_x(kind, false);
        let record = predictor.get_results();

        assert!(!record.contains_key("scale_x"));
        assert_eq!(record.predictor(), Some(kind.short_name()));
        assert_eq!(record.predictor_conf(), Some(predictor.short_config().as_str()));
        for key in ["degree", "epsilon", "max_tree_depth", "alpha"] {
            assert!(record.contains_key(key), "{} missing {}", kind, key);
        }
    }
}

#[test]
fn test_get_results_is_fresh_each_call() {
    let predictor = with_scale_x(PredictorKind::LassoRegression, true);
    let mut first = predictor.get_results();
    first.insert("predictions", vec![1.0, 2.0]);

    let second = predictor.get_results();
    assert!(!second.contains_key("predictions"));
}

#[test]
fn test_short_names_are_uppercase() {
    for kind in PredictorKind::ALL {
        let predictor = Predictor::from_config(kind, &RawConfig::new()).unwrap();
        let short = predictor.short_name();
        assert!(!short.is_empty());
        assert!(short.chars().all(|c| c.is_ascii_uppercase()), "{}", short);
        assert!(predictor.short_config().starts_with(&format!("{}_", short)));
    }
}

#[test]
fn test_reinitialize_between_repetitions() {
    let (x, y) = regression_data();

    for kind in PredictorKind::ALL {
        let mut predictor = Predictor::from_config(kind, &RawConfig::new()).unwrap();
        for repetition in 0..3 {
            predictor.reinitialize(repetition);
            predictor.train(&x, &y).unwrap();
            assert!(predictor.predict(&x).is_ok());
        }
    }
}

#[test]
fn test_generate_with_empty_config_yields_one_untrained_instance() {
    for kind in PredictorKind::ALL {
        let predictors = Predictor::generate(kind, &RawConfig::new()).unwrap();
        assert_eq!(predictors.len(), 1, "{}", kind);

        let predictor = &predictors[0];
        assert!(!predictor.is_trained());
        assert_eq!(predictor.name(), kind.name());
        assert_eq!(predictor.params(), &PredictorParams::default());
    }
}

#[test]
fn test_predict_before_train_fails() {
    let predictor = Predictor::from_config(PredictorKind::SgdRegression, &RawConfig::new()).unwrap();
    let result = predictor.predict(&array![[1.0, 2.0]]);
    assert!(matches!(result, Err(PredictorError::ModelNotFitted)));
}

#[test]
fn test_train_all_matches_sequential_training() {
    let (x, y) = regression_data();
    let raw = RawConfig::new().with_epsilon(ParamSpec::list([0.05, 0.1, 0.5]));
    let mut parallel = Predictor::generate(PredictorKind::SvrLinearKernel, &raw).unwrap();
    let mut sequential = parallel.clone();

    for outcome in train_all(&mut parallel, &x, &y) {
        outcome.unwrap();
    }
    for predictor in sequential.iter_mut() {
        predictor.train(&x, &y).unwrap();
    }

    for (a, b) in parallel.iter().zip(&sequential) {
        let pa = a.predict(&x).unwrap();
        let pb = b.predict(&x).unwrap();
        assert!((&pa - &pb).iter().all(|d| d.abs() < 1e-12));
    }
}

#[test]
fn test_every_kind_rejects_non_finite_training_data() {
    let (mut x, y) = regression_data();
    x[[3, 1]] = f64::NAN;

    for kind in PredictorKind::ALL {
        for scale_x in [true, false] {
            let mut predictor = with_scale_x(kind, scale_x);
            let result = predictor.train(&x, &y);
            assert!(
                matches!(result, Err(PredictorError::ComputationError(_))),
                "{} (scale_x={}) accepted NaN features: {:?}",
                kind,
                scale_x,
                result
            );
            assert!(!predictor.is_trained());
        }
    }
}
