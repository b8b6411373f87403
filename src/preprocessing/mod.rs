//! Feature preprocessing applied before training and prediction

mod scaler;

pub use scaler::{MinMaxScaler, ScaleMode};
