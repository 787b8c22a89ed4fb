use serde::Serialize;
use std::fmt;

/// Declared shape of an input field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kind {
    /// Continuous value with an inclusive range.
    Float { min: f64, max: f64 },
    /// Categorical / boolean-like code with an inclusive range.
    Code { min: i64, max: i64 },
}

/// The thirteen request keys, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    HighSchool,
    MathScore,
    EnglishGrade,
    FirstTermGpa,
    AgeGroup,
    Gender,
    Residency,
    FirstLanguage,
    FastTrack,
    Coop,
    PrevEducation,
    School,
    Funding,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::HighSchool,
        Field::MathScore,
        Field::EnglishGrade,
        Field::FirstTermGpa,
        Field::AgeGroup,
        Field::Gender,
        Field::Residency,
        Field::FirstLanguage,
        Field::FastTrack,
        Field::Coop,
        Field::PrevEducation,
        Field::School,
        Field::Funding,
    ];

    /// Wire name (case-sensitive JSON key).
    pub fn key(self) -> &'static str {
        match self {
            Field::HighSchool => "highSchool",
            Field::MathScore => "mathScore",
            Field::EnglishGrade => "englishGrade",
            Field::FirstTermGpa => "firstTermGpa",
            Field::AgeGroup => "ageGroup",
            Field::Gender => "gender",
            Field::Residency => "residency",
            Field::FirstLanguage => "firstLanguage",
            Field::FastTrack => "fastTrack",
            Field::Coop => "coop",
            Field::PrevEducation => "prevEducation",
            Field::School => "school",
            Field::Funding => "funding",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn kind(self) -> Kind {
        match self {
            Field::HighSchool => Kind::Float { min: 0.0, max: 100.0 },
            Field::MathScore => Kind::Float { min: 0.0, max: 100.0 },
            Field::FirstTermGpa => Kind::Float { min: 0.0, max: 4.5 },
            Field::EnglishGrade => Kind::Code { min: 1, max: 11 },
            Field::AgeGroup => Kind::Code { min: 1, max: 10 },
            // 0 = not stated
            Field::Gender => Kind::Code { min: 0, max: 3 },
            Field::Residency => Kind::Code { min: 1, max: 2 },
            Field::FirstLanguage => Kind::Code { min: 1, max: 3 },
            // 1 = yes; 0 and 2 both mean no
            Field::FastTrack | Field::Coop => Kind::Code { min: 0, max: 2 },
            Field::PrevEducation => Kind::Code { min: 1, max: 2 },
            Field::School => Kind::Code { min: 1, max: 7 },
            Field::Funding => Kind::Code { min: 1, max: 9 },
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Validated, normalized input for one prediction. Only built by `validate`.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentFeatures {
    pub(crate) high_school: f64,
    pub(crate) math_score: f64,
    pub(crate) english_grade: i64,
    pub(crate) first_term_gpa: f64,
    pub(crate) age_group: i64,
    pub(crate) gender: i64,
    pub(crate) residency: i64,
    pub(crate) first_language: i64,
    pub(crate) fast_track: i64,
    pub(crate) coop: i64,
    pub(crate) prev_education: i64,
    pub(crate) school: i64,
    pub(crate) funding: i64,
}

impl StudentFeatures {
    pub fn high_school(&self) -> f64 {
        self.high_school
    }
    pub fn math_score(&self) -> f64 {
        self.math_score
    }
    pub fn english_grade(&self) -> i64 {
        self.english_grade
    }
    pub fn first_term_gpa(&self) -> f64 {
        self.first_term_gpa
    }
    pub fn age_group(&self) -> i64 {
        self.age_group
    }
    pub fn gender(&self) -> i64 {
        self.gender
    }
    pub fn residency(&self) -> i64 {
        self.residency
    }
    pub fn first_language(&self) -> i64 {
        self.first_language
    }
    pub fn prev_education(&self) -> i64 {
        self.prev_education
    }
    pub fn school(&self) -> i64 {
        self.school
    }
    pub fn funding(&self) -> i64 {
        self.funding
    }
    pub fn is_fast_track(&self) -> bool {
        self.fast_track == 1
    }
    pub fn is_coop(&self) -> bool {
        self.coop == 1
    }

    /// Value of one field as `f64`.
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::HighSchool => self.high_school,
            Field::MathScore => self.math_score,
            Field::EnglishGrade => self.english_grade as f64,
            Field::FirstTermGpa => self.first_term_gpa,
            Field::AgeGroup => self.age_group as f64,
            Field::Gender => self.gender as f64,
            Field::Residency => self.residency as f64,
            Field::FirstLanguage => self.first_language as f64,
            Field::FastTrack => self.fast_track as f64,
            Field::Coop => self.coop as f64,
            Field::PrevEducation => self.prev_education as f64,
            Field::School => self.school as f64,
            Field::Funding => self.funding as f64,
        }
    }

    /// All values in canonical field order.
    pub fn to_vector(&self) -> Vec<f64> {
        Field::ALL.iter().map(|f| self.get(*f)).collect()
    }
}

// ---------- Wire types ----------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionOut {
    pub status: &'static str,
    pub predicted_gpa: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<serde_json::Value>,
}

impl PredictionOut {
    pub fn success(predicted_gpa: f64, received: Option<serde_json::Value>) -> Self {
        Self {
            status: "success",
            predicted_gpa,
            received,
        }
    }
}
