use std::fmt;

use serde::{Deserialize, Serialize};

use super::validate::{self, Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    Strength,
    Cardio,
    Flexibility,
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseType::Strength => write!(f, "Strength"),
            ExerciseType::Cardio => write!(f, "Cardio"),
            ExerciseType::Flexibility => write!(f, "Flexibility"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
    #[serde(rename = "videoUrl", default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExercise {
    pub name: String,
    pub category: String,
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
    #[serde(rename = "videoUrl", skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl Validate for NewExercise {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::non_empty("name", &self.name)?;
        validate::non_empty("category", &self.category)?;
        if let Some(ref url) = self.video_url {
            check_video_url(url)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExercisePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub exercise_type: Option<ExerciseType>,
    #[serde(rename = "videoUrl", skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl Validate for ExercisePatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if *self == Self::default() {
            return Err(ValidationError::new("patch", "no fields to update"));
        }
        if let Some(ref name) = self.name {
            validate::non_empty("name", name)?;
        }
        if let Some(ref category) = self.category {
            validate::non_empty("category", category)?;
        }
        if let Some(ref url) = self.video_url {
            check_video_url(url)?;
        }
        Ok(())
    }
}

fn check_video_url(url: &str) -> Result<(), ValidationError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ValidationError::new("videoUrl", "must be an http(s) URL"))
    }
}
