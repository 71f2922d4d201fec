use crate::domain::person::{Gender, Person};
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_AGE: u32 = 130;

/// Raw answers as a front end collects them. Nothing here is trusted until `validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Questionnaire {
    pub age: u32,
    pub gender: String,
    pub current_income: f64,
    pub retirement_age: u32,
    #[serde(default)]
    pub married: bool,
    #[serde(default)]
    pub spouse_income: Option<f64>,
    #[serde(default)]
    pub kids: u32,
    pub target_savings: f64,
    #[serde(default)]
    pub owns_house: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub person: Person,
    pub current_income: f64,
    pub retirement_age: u32,
    pub married: bool,
    /// Zero unless married.
    pub spouse_income: f64,
    pub kids: u32,
    pub target_savings: f64,
    pub owns_house: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    InvalidGender(String),
    InvalidAmount { field: &'static str, value: f64 },
    OutOfRange { field: &'static str, value: u32, max: u32 },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGender(raw) => {
                write!(f, "invalid gender {raw:?}: expected \"male\" or \"female\"")
            }
            Self::InvalidAmount { field, value } => {
                write!(f, "{field} must be a non-negative amount (got {value})")
            }
            Self::OutOfRange { field, value, max } => {
                write!(f, "{field} must be between 0 and {max} (got {value})")
            }
        }
    }
}

impl std::error::Error for InputError {}

impl InputError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidGender(_) => "gender",
            Self::InvalidAmount { field, .. } | Self::OutOfRange { field, .. } => field,
        }
    }
}

impl Questionnaire {
    pub fn validate(self) -> Result<Submission, InputError> {
        let gender =
            Gender::parse(&self.gender).ok_or_else(|| InputError::InvalidGender(self.gender.clone()))?;

        check_age("age", self.age)?;
        check_age("retirement_age", self.retirement_age)?;
        check_amount("current_income", self.current_income)?;
        check_amount("target_savings", self.target_savings)?;

        let spouse_income = if self.married {
            let v = self.spouse_income.unwrap_or(0.0);
            check_amount("spouse_income", v)?;
            v
        } else {
            0.0
        };

        Ok(Submission {
            person: Person {
                age: self.age,
                gender,
            },
            current_income: self.current_income,
            retirement_age: self.retirement_age,
            married: self.married,
            spouse_income,
            kids: self.kids,
            target_savings: self.target_savings,
            owns_house: self.owns_house,
        })
    }
}

fn check_age(field: &'static str, value: u32) -> Result<(), InputError> {
    if value > MAX_AGE {
        return Err(InputError::OutOfRange {
            field,
            value,
            max: MAX_AGE,
        });
    }
    Ok(())
}

fn check_amount(field: &'static str, value: f64) -> Result<(), InputError> {
    if !value.is_finite() || value < 0.0 {
        return Err(InputError::InvalidAmount { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Questionnaire {
        Questionnaire {
            age: 50,
            gender: " Female ".to_string(),
            current_income: 85_000.0,
            retirement_age: 65,
            married: false,
            spouse_income: Some(40_000.0),
            kids: 2,
            target_savings: 1_500_000.0,
            owns_house: true,
        }
    }

    #[test]
    fn normalises_gender_and_drops_spouse_income_when_single() {
        let s = sample().validate().unwrap();
        assert_eq!(s.person.gender, Gender::Female);
        assert_eq!(s.spouse_income, 0.0);
    }

    #[test]
    fn keeps_spouse_income_when_married() {
        let mut q = sample();
        q.married = true;
        assert_eq!(q.validate().unwrap().spouse_income, 40_000.0);
    }

    #[test]
    fn rejects_unknown_gender() {
        let mut q = sample();
        q.gender = "robot".to_string();
        let err = q.validate().unwrap_err();
        assert_eq!(err, InputError::InvalidGender("robot".to_string()));
        assert_eq!(err.field(), "gender");
    }

    #[test]
    fn rejects_negative_and_non_finite_amounts() {
        let mut q = sample();
        q.current_income = -1.0;
        assert_eq!(q.validate().unwrap_err().field(), "current_income");

        let mut q = sample();
        q.target_savings = f64::NAN;
        assert_eq!(q.validate().unwrap_err().field(), "target_savings");

        let mut q = sample();
        q.married = true;
        q.spouse_income = Some(f64::INFINITY);
        assert_eq!(q.validate().unwrap_err().field(), "spouse_income");
    }

    #[test]
    fn rejects_implausible_ages() {
        let mut q = sample();
        q.retirement_age = 400;
        assert_eq!(
            q.validate().unwrap_err(),
            InputError::OutOfRange {
                field: "retirement_age",
                value: 400,
                max: 130
            }
        );
    }

    #[test]
    fn deserializes_with_optional_fields_missing() {
        let q: Questionnaire = serde_json::from_value(json!({
            "age": 38,
            "gender": "male",
            "current_income": 60000.0,
            "retirement_age": 67,
            "target_savings": 900000.0
        }))
        .unwrap();
        let s = q.validate().unwrap();
        assert!(!s.married);
        assert!(!s.owns_house);
        assert_eq!(s.kids, 0);
    }
}
