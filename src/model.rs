use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

use crate::error::EstimateError;
use crate::types::{Field, StudentFeatures};

/// Maps a validated record to a predicted GPA.
///
/// Implementations may block (file or network backed models); the service
/// always calls them off the async runtime and under a timeout.
pub trait Estimator: Send + Sync + 'static {
    fn estimate(&self, features: &StudentFeatures) -> Result<f64, EstimateError>;

    fn name(&self) -> &'static str;
}

/// Returns the same value for every input.
#[derive(Debug, Clone, Copy)]
pub struct ConstantEstimator(pub f64);

impl Default for ConstantEstimator {
    fn default() -> Self {
        Self(3.21)
    }
}

impl Estimator for ConstantEstimator {
    fn estimate(&self, _features: &StudentFeatures) -> Result<f64, EstimateError> {
        Ok(self.0)
    }

    fn name(&self) -> &'static str {
        "constant"
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LinearJson {
    intercept: f64,
    #[serde(default)]
    weights: HashMap<String, f64>,
    clamp: Option<[f64; 2]>,
}

/// `intercept + Σ wᵢ·xᵢ` over the canonical feature vector, clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearEstimator {
    intercept: f64,
    weights: Vec<f64>, // one per Field::ALL entry
    clamp: (f64, f64),
}

impl LinearEstimator {
    pub fn new(intercept: f64, weights: Vec<f64>, clamp: (f64, f64)) -> Result<Self> {
        if weights.len() != Field::ALL.len() {
            bail!("expected {} weights, got {}", Field::ALL.len(), weights.len());
        }
        if clamp.0.is_nan() || clamp.1.is_nan() || clamp.0 > clamp.1 {
            bail!("invalid clamp range [{}, {}]", clamp.0, clamp.1);
        }
        if !intercept.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            bail!("model coefficients must be finite");
        }
        Ok(Self { intercept, weights, clamp })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let txt = fs::read_to_string(path)
            .with_context(|| format!("failed to read model at {}", path.display()))?;
        Self::from_json(&txt).with_context(|| format!("failed to parse model {}", path.display()))
    }

    pub fn from_json(txt: &str) -> Result<Self> {
        let raw: LinearJson = serde_json::from_str(txt)?;

        let mut weights = vec![0.0; Field::ALL.len()];
        for (name, w) in &raw.weights {
            let Some(field) = Field::from_key(name) else {
                bail!("unknown feature in weights: {name}");
            };
            weights[field as usize] = *w;
        }
        let [lo, hi] = raw.clamp.unwrap_or([0.0, 4.5]);
        Self::new(raw.intercept, weights, (lo, hi))
    }
}

impl Estimator for LinearEstimator {
    fn estimate(&self, features: &StudentFeatures) -> Result<f64, EstimateError> {
        let x = features.to_vector();
        if x.len() != self.weights.len() {
            return Err(EstimateError::Shape {
                got: x.len(),
                expected: self.weights.len(),
            });
        }
        let y = self.intercept + x.iter().zip(&self.weights).map(|(a, w)| a * w).sum::<f64>();
        Ok(y.clamp(self.clamp.0, self.clamp.1))
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}

/// Reference record used to warm an estimator up before serving.
pub fn warmup_features() -> StudentFeatures {
    StudentFeatures {
        high_school: 75.0,
        math_score: 70.0,
        english_grade: 1,
        first_term_gpa: 3.0,
        age_group: 2,
        gender: 0,
        residency: 1,
        first_language: 1,
        fast_track: 0,
        coop: 0,
        prev_education: 1,
        school: 1,
        funding: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_ignores_input() {
        let f = warmup_features();
        assert_eq!(ConstantEstimator::default().estimate(&f).unwrap(), 3.21);
        assert_eq!(ConstantEstimator(2.0).estimate(&f).unwrap(), 2.0);
    }

    #[test]
    fn linear_from_json_applies_named_weights() {
        let m = LinearEstimator::from_json(
            r#"{"intercept": 0.5, "weights": {"firstTermGpa": 0.5, "coop": 0.1}}"#,
        )
        .unwrap();
        // 0.5 + 0.5*3.0 + 0.1*0
        let y = m.estimate(&warmup_features()).unwrap();
        assert!((y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn linear_output_is_clamped() {
        let m = LinearEstimator::from_json(
            r#"{"intercept": 0.0, "weights": {"highSchool": 1.0}, "clamp": [0.0, 4.0]}"#,
        )
        .unwrap();
        assert_eq!(m.estimate(&warmup_features()).unwrap(), 4.0);
    }

    #[test]
    fn linear_rejects_unknown_features_and_bad_clamp() {
        let unknown = r#"{"intercept": 1.0, "weights": {"shoeSize": 1.0}}"#;
        assert!(LinearEstimator::from_json(unknown).is_err());
        assert!(LinearEstimator::from_json(r#"{"intercept": 1.0, "clamp": [4.0, 1.0]}"#).is_err());
        assert!(LinearEstimator::new(0.0, vec![0.0; 3], (0.0, 4.5)).is_err());
    }

    #[test]
    fn load_reports_path_on_missing_file() {
        let err = LinearEstimator::load("/nonexistent/model.json").unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/model.json"));
    }
}
