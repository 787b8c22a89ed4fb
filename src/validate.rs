//! Payload extraction, coercion and domain checks.

use serde_json::{Map, Value};

use crate::error::{Reason, ValidationError};
use crate::types::{Field, Kind, StudentFeatures};

/// A coerced value before it is placed in the record.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Scalar {
    Float(f64),
    Code(i64),
}

impl Scalar {
    fn float(self) -> f64 {
        match self {
            Scalar::Float(x) => x,
            Scalar::Code(c) => c as f64,
        }
    }

    fn code(self) -> i64 {
        match self {
            Scalar::Code(c) => c,
            Scalar::Float(x) => x as i64,
        }
    }
}

/// Validate a decoded request body. The first failing field (canonical order) is reported.
pub fn features_from_value(raw: &Value) -> Result<StudentFeatures, ValidationError> {
    let obj = raw.as_object().ok_or_else(|| {
        ValidationError::new("body", Reason::Malformed, "request body must be a JSON object")
    })?;
    features_from_map(obj)
}

pub fn features_from_map(obj: &Map<String, Value>) -> Result<StudentFeatures, ValidationError> {
    let mut vals = [Scalar::Code(0); 13];
    for (slot, field) in vals.iter_mut().zip(Field::ALL) {
        *slot = extract(obj, field)?;
    }
    let [hs, ms, eg, gpa, age, gender, res, lang, ft, coop, prev, school, funding] = vals;

    Ok(StudentFeatures {
        high_school: hs.float(),
        math_score: ms.float(),
        english_grade: eg.code(),
        first_term_gpa: gpa.float(),
        age_group: age.code(),
        gender: gender.code(),
        residency: res.code(),
        first_language: lang.code(),
        fast_track: ft.code(),
        coop: coop.code(),
        prev_education: prev.code(),
        school: school.code(),
        funding: funding.code(),
    })
}

fn extract(obj: &Map<String, Value>, field: Field) -> Result<Scalar, ValidationError> {
    let v = match obj.get(field.key()) {
        None | Some(Value::Null) => return Err(ValidationError::missing(field.key())),
        Some(v) => v,
    };

    match field.kind() {
        Kind::Float { min, max } => {
            let x = coerce_float(v).ok_or_else(|| {
                let msg = format!("{field} must be a number");
                ValidationError::new(field.key(), Reason::Unparsable, msg)
            })?;
            if !(min..=max).contains(&x) {
                return Err(out_of_range(field, min, max));
            }
            Ok(Scalar::Float(x))
        }
        Kind::Code { min, max } => {
            let c = coerce_code(v).ok_or_else(|| {
                let msg = format!("{field} must be an integer");
                ValidationError::new(field.key(), Reason::Unparsable, msg)
            })?;
            if !(min..=max).contains(&c) {
                return Err(out_of_range(field, min, max));
            }
            Ok(Scalar::Code(c))
        }
    }
}

fn out_of_range<T: std::fmt::Display>(field: Field, min: T, max: T) -> ValidationError {
    ValidationError::new(
        field.key(),
        Reason::OutOfRange,
        format!("{field} must be between {min} and {max}"),
    )
}

fn coerce_float(v: &Value) -> Option<f64> {
    let x = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    x.is_finite().then_some(x)
}

fn coerce_code(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            let x = n.as_f64()?;
            // integral floats only (2.0 ok, 2.5 not)
            (x.is_finite() && x.fract() == 0.0 && x.abs() < i64::MAX as f64).then_some(x as i64)
        }
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
