//! Serving layer for student GPA predictions: request validation, a pluggable
//! estimator, and the `POST /predict` HTTP surface.

pub mod config;
pub mod error;
pub mod model;
pub mod server;
pub mod service;
pub mod types;
pub mod validate;

pub use error::{ApiError, EstimateError, PredictionFailure, Reason, ValidationError};
pub use model::{ConstantEstimator, Estimator, LinearEstimator};
pub use service::PredictionService;
pub use types::{Field, PredictionOut, StudentFeatures};
