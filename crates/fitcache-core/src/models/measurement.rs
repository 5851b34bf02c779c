use serde::{Deserialize, Serialize};

use super::validate::{self, Validate, ValidationError};

/// Body measurements. Lengths are in the user's preferred units; nothing here converts them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub id: String,
    pub user_id: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_fat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waist: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chest: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMeasurement {
    pub user_id: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waist: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chest: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arm: Option<f64>,
}

impl NewMeasurement {
    fn has_values(&self) -> bool {
        [self.weight, self.body_fat, self.waist, self.chest, self.arm]
            .iter()
            .any(Option::is_some)
    }
}

impl Validate for NewMeasurement {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::non_empty("userId", &self.user_id)?;
        validate::date("date", &self.date)?;
        if !self.has_values() {
            return Err(ValidationError::new("measurement", "at least one value is required"));
        }
        check_values(self.weight, self.body_fat, self.waist, self.chest, self.arm)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waist: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chest: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arm: Option<f64>,
}

impl Validate for MeasurementPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if *self == Self::default() {
            return Err(ValidationError::new("patch", "no fields to update"));
        }
        if let Some(ref date) = self.date {
            validate::date("date", date)?;
        }
        check_values(self.weight, self.body_fat, self.waist, self.chest, self.arm)
    }
}

fn check_values(
    weight: Option<f64>,
    body_fat: Option<f64>,
    waist: Option<f64>,
    chest: Option<f64>,
    arm: Option<f64>,
) -> Result<(), ValidationError> {
    validate::non_negative_opt("weight", weight)?;
    validate::non_negative_opt("bodyFat", body_fat)?;
    if let Some(pct) = body_fat {
        if pct > 100.0 {
            return Err(ValidationError::new("bodyFat", "must be a percentage (0-100)"));
        }
    }
    validate::non_negative_opt("waist", waist)?;
    validate::non_negative_opt("chest", chest)?;
    validate::non_negative_opt("arm", arm)
}
