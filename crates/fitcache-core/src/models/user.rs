use serde::{Deserialize, Serialize};

use super::validate::{self, Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitsPreference {
    Metric,
    Imperial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub fitness_goal: Option<String>,
    #[serde(default)]
    pub units_preference: Option<UnitsPreference>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of `POST /users`. The backend owns hashing policy; this only carries the value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fitness_goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units_preference: Option<UnitsPreference>,
}

impl Validate for NewUser {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::non_empty("name", &self.name)?;
        validate::non_empty("passwordHash", &self.password_hash)?;
        match self.email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => return Err(ValidationError::new("email", "not an email address")),
        }
        validate::non_negative_opt("height", self.height)?;
        validate::non_negative_opt("weight", self.weight)
    }
}
