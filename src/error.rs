use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    Missing,
    Unparsable,
    OutOfRange,
    Malformed,
}

impl Reason {
    pub fn as_str(self) -> &'static str {
        match self {
            Reason::Missing => "missing",
            Reason::Unparsable => "unparsable",
            Reason::OutOfRange => "out_of_range",
            Reason::Malformed => "malformed",
        }
    }
}

/// Client-caused input error. Always names the offending field.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub reason: Reason,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: Reason, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason,
            message: message.into(),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("{field} is required");
        Self::new(field, Reason::Missing, message)
    }
}

/// Fault reported by an estimator.
#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("model unavailable: {0}")]
    Unavailable(String),
    #[error("feature length mismatch: got {got}, expected {expected}")]
    Shape { got: usize, expected: usize },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Server-side fault while producing a prediction. The detail is for logs only.
#[derive(Debug, Error)]
pub enum PredictionFailure {
    #[error("estimator failed: {0}")]
    Estimator(#[from] EstimateError),
    #[error("estimator returned a non-finite value ({0})")]
    NonFinite(f64),
    #[error("estimator timed out after {0} ms")]
    Timeout(u64),
    #[error("estimator task aborted: {0}")]
    Aborted(String),
}

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Prediction(#[from] PredictionFailure),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation(e) => {
                tracing::info!(field = %e.field, reason = e.reason.as_str(), "rejected request");
                json!({
                    "status": "error",
                    "field": e.field,
                    "reason": e.reason.as_str(),
                    "message": e.message,
                })
            }
            ApiError::Prediction(e) => {
                tracing::error!(error = %e, "prediction failed");
                json!({ "status": "error", "message": "prediction failed" })
            }
        };
        (status, Json(body)).into_response()
    }
}
