//! Payload validation performed before any request leaves the client.

use chrono::{DateTime, NaiveDate};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Implemented by every create payload and partial-update patch.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

pub(crate) fn non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::new(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(ValidationError::new(field, format!("must not be negative (got {})", value)));
    }
    Ok(())
}

pub(crate) fn non_negative_opt(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(v) => non_negative(field, v),
        None => Ok(()),
    }
}

/// Accepts either a calendar date (`2024-05-27`) or an RFC 3339 timestamp.
pub(crate) fn date(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(value).is_ok()
    {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            format!("expected YYYY-MM-DD or RFC 3339 timestamp, got {:?}", value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert!(non_empty("name", "Squat").is_ok());
        assert_eq!(non_empty("name", "   ").unwrap_err().field, "name");
    }

    #[test]
    fn test_non_negative() {
        assert!(non_negative("calories", 0.0).is_ok());
        assert!(non_negative("calories", 350.0).is_ok());
        assert!(non_negative("calories", -1.0).is_err());
        assert!(non_negative("calories", f64::NAN).is_err());
        assert!(non_negative_opt("sugar", None).is_ok());
        assert!(non_negative_opt("sugar", Some(-0.5)).is_err());
    }

    #[test]
    fn test_date_formats() {
        assert!(date("date", "2024-05-27").is_ok());
        assert!(date("date", "2024-05-27T08:30:00Z").is_ok());
        assert!(date("date", "2024-05-27T08:30:00.000+02:00").is_ok());
        assert!(date("date", "27/05/2024").is_err());
        assert!(date("date", "").is_err());
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::new("protein", "must not be negative (got -3)");
        assert_eq!(err.to_string(), "invalid protein: must not be negative (got -3)");
    }
}
