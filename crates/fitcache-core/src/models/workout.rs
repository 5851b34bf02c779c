use serde::{Deserialize, Serialize};

use super::validate::{self, Validate, ValidationError};
use super::Exercise;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: String,
    pub user_id: String,
    pub date: String,
    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories_burned: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub entries: Vec<WorkoutEntry>,
}

impl WorkoutSession {
    pub fn total_sets(&self) -> u32 {
        self.entries
            .iter()
            .fold(0u32, |total, e| total.saturating_add(e.sets))
    }

    /// Calendar day part of `date`, for grouping.
    pub fn day(&self) -> &str {
        crate::utils::day_key(&self.date)
    }

    /// Sum of sets x reps x weight across all entries.
    pub fn volume(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.sets as f64 * e.reps as f64 * e.weight)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutEntry {
    pub id: String,
    pub workout_session_id: String,
    pub exercise_id: String,
    /// Populated when the backend embeds the referenced exercise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise: Option<Exercise>,
    pub sets: u32,
    pub reps: u32,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkout {
    pub user_id: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories_burned: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub entries: Vec<NewWorkoutEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkoutEntry {
    pub exercise_id: String,
    pub sets: u32,
    pub reps: u32,
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Validate for NewWorkout {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::non_empty("userId", &self.user_id)?;
        validate::date("date", &self.date)?;
        for entry in &self.entries {
            entry.validate()?;
        }
        Ok(())
    }
}

impl Validate for NewWorkoutEntry {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::non_empty("exerciseId", &self.exercise_id)?;
        if self.sets == 0 {
            return Err(ValidationError::new("sets", "must be at least 1"));
        }
        if self.reps == 0 {
            return Err(ValidationError::new("reps", "must be at least 1"));
        }
        validate::non_negative("weight", self.weight)
    }
}

/// Partial update for `PUT /workouts/{id}`. Entries are not editable through this route.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories_burned: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl WorkoutPatch {
    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Validate for WorkoutPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::new("patch", "no fields to update"));
        }
        if let Some(ref date) = self.date {
            validate::date("date", date)?;
        }
        Ok(())
    }
}
