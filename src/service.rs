use serde_json::Value;
use std::{sync::Arc, time::Duration};

use crate::error::{ApiError, PredictionFailure};
use crate::model::Estimator;
use crate::types::{PredictionOut, StudentFeatures};
use crate::validate;

/// Validate → normalize → predict → serialize. Holds no per-request state.
#[derive(Clone)]
pub struct PredictionService {
    estimator: Arc<dyn Estimator>,
    timeout: Duration,
    echo_input: bool,
}

impl PredictionService {
    pub fn new(estimator: Arc<dyn Estimator>, timeout: Duration, echo_input: bool) -> Self {
        Self {
            estimator,
            timeout,
            echo_input,
        }
    }

    pub fn estimator_name(&self) -> &'static str {
        self.estimator.name()
    }

    pub async fn predict(&self, raw: Value) -> Result<PredictionOut, ApiError> {
        let features = validate::features_from_value(&raw)?;
        let gpa = self.estimate(features).await?;
        tracing::debug!(estimator = self.estimator.name(), predicted_gpa = gpa, "prediction ok");

        let received = self.echo_input.then_some(raw);
        Ok(PredictionOut::success(gpa, received))
    }

    /// Run the estimator on the blocking pool, bounded by the configured timeout.
    pub async fn estimate(&self, features: StudentFeatures) -> Result<f64, PredictionFailure> {
        let est = Arc::clone(&self.estimator);
        let task = tokio::task::spawn_blocking(move || est.estimate(&features));

        let joined = tokio::time::timeout(self.timeout, task)
            .await
            .map_err(|_| PredictionFailure::Timeout(self.timeout.as_millis() as u64))?;
        let y = joined.map_err(|e| PredictionFailure::Aborted(e.to_string()))??;

        if !y.is_finite() {
            return Err(PredictionFailure::NonFinite(y));
        }
        Ok(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EstimateError, Reason};
    use crate::model::{warmup_features, ConstantEstimator};
    use serde_json::json;

    struct Broken;

    impl Estimator for Broken {
        fn estimate(&self, _: &StudentFeatures) -> Result<f64, EstimateError> {
            Err(EstimateError::Unavailable("/srv/models/gpa.bin".into()))
        }
        fn name(&self) -> &'static str {
            "broken"
        }
    }

    struct Nan;

    impl Estimator for Nan {
        fn estimate(&self, _: &StudentFeatures) -> Result<f64, EstimateError> {
            Ok(f64::NAN)
        }
        fn name(&self) -> &'static str {
            "nan"
        }
    }

    struct Panicky;

    impl Estimator for Panicky {
        fn estimate(&self, _: &StudentFeatures) -> Result<f64, EstimateError> {
            panic!("weights missing at /srv/models/gpa.json")
        }
        fn name(&self) -> &'static str {
            "panicky"
        }
    }

    fn svc(est: impl Estimator, echo: bool) -> PredictionService {
        PredictionService::new(Arc::new(est), Duration::from_secs(1), echo)
    }

    fn payload() -> Value {
        json!({
            "highSchool": 85.0, "mathScore": 78.0, "englishGrade": 2, "firstTermGpa": 3.1,
            "ageGroup": 1, "gender": 0, "residency": 1, "firstLanguage": 1, "fastTrack": 0,
            "coop": 1, "prevEducation": 2, "school": 3, "funding": 1
        })
    }

    #[tokio::test]
    async fn echoes_raw_input_when_enabled() {
        let out = svc(ConstantEstimator::default(), true).predict(payload()).await.unwrap();
        assert_eq!(out.status, "success");
        assert_eq!(out.predicted_gpa, 3.21);
        assert_eq!(out.received, Some(payload()));

        let out = svc(ConstantEstimator::default(), false).predict(payload()).await.unwrap();
        assert!(out.received.is_none());
    }

    #[tokio::test]
    async fn validation_runs_before_the_estimator() {
        let err = svc(Broken, true).predict(json!({})).await.unwrap_err();
        match err {
            ApiError::Validation(e) => {
                assert_eq!((e.field.as_str(), e.reason), ("highSchool", Reason::Missing))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn estimator_faults_become_prediction_failures() {
        let err = svc(Broken, true).estimate(warmup_features()).await.unwrap_err();
        assert!(matches!(err, PredictionFailure::Estimator(_)));

        let err = svc(Nan, true).estimate(warmup_features()).await.unwrap_err();
        assert!(matches!(err, PredictionFailure::NonFinite(_)));
    }

    #[tokio::test]
    async fn estimator_panic_becomes_prediction_failure() {
        let err = svc(Panicky, true).estimate(warmup_features()).await.unwrap_err();
        assert!(matches!(err, PredictionFailure::Aborted(_)));

        let err = svc(Panicky, true).predict(payload()).await.unwrap_err();
        assert!(matches!(err, ApiError::Prediction(PredictionFailure::Aborted(_))));
    }
}
