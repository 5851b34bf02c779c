//! Data models for fitness-tracker entities.
//!
//! This module contains the resources served by the REST backend:
//!
//! - `WorkoutSession`, `WorkoutEntry`: logged workouts and their sets
//! - `Exercise`: the exercise catalog
//! - `NutritionEntry`: meals with macro breakdown
//! - `Measurement`: body measurements
//! - `User`: accounts (create and list only, never cached)
//!
//! Each resource has a typed create payload and partial-update patch that
//! implement `Validate`, checked before any request is sent.

pub mod exercise;
pub mod measurement;
pub mod nutrition;
pub mod resource;
pub mod user;
pub mod validate;
pub mod workout;

pub use exercise::{Exercise, ExercisePatch, ExerciseType, NewExercise};
pub use measurement::{Measurement, MeasurementPatch, NewMeasurement};
pub use nutrition::{NewNutritionEntry, NutritionEntry, NutritionPatch};
pub use resource::{Resource, ResourceKind, ResourceList};
pub use user::{NewUser, UnitsPreference, User};
pub use validate::{Validate, ValidationError};
pub use workout::{NewWorkout, NewWorkoutEntry, WorkoutEntry, WorkoutPatch, WorkoutSession};
