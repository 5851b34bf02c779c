//! Resource kinds and the trait tying each kind to its REST path and payload types.

use std::fmt;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use super::{Exercise, Measurement, NutritionEntry, Validate, WorkoutSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Workouts,
    Exercises,
    Nutrition,
    Measurements,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Workouts,
        ResourceKind::Exercises,
        ResourceKind::Nutrition,
        ResourceKind::Measurements,
    ];

    /// Path segment under the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            ResourceKind::Workouts => "workouts",
            ResourceKind::Exercises => "exercises",
            ResourceKind::Nutrition => "nutrition",
            ResourceKind::Measurements => "measurements",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A cached collection, tagged by the kind it holds.
#[derive(Debug, Clone)]
pub enum ResourceList {
    Workouts(Arc<Vec<WorkoutSession>>),
    Exercises(Arc<Vec<Exercise>>),
    Nutrition(Arc<Vec<NutritionEntry>>),
    Measurements(Arc<Vec<Measurement>>),
}

impl ResourceList {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceList::Workouts(_) => ResourceKind::Workouts,
            ResourceList::Exercises(_) => ResourceKind::Exercises,
            ResourceList::Nutrition(_) => ResourceKind::Nutrition,
            ResourceList::Measurements(_) => ResourceKind::Measurements,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ResourceList::Workouts(items) => items.len(),
            ResourceList::Exercises(items) => items.len(),
            ResourceList::Nutrition(items) => items.len(),
            ResourceList::Measurements(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A server resource addressable by `/{path}`, `/{path}/user/{userId}` and `/{path}/{id}`.
pub trait Resource: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    const KIND: ResourceKind;

    /// Body of `POST /{path}`.
    type Create: Validate + Serialize + Send + Sync;

    /// Body of `PUT /{path}/{id}`; only the fields set are sent.
    type Patch: Validate + Serialize + Send + Sync;

    fn id(&self) -> &str;

    /// User the resource belongs to. `None` for shared kinds such as the exercise catalog.
    fn owner(&self) -> Option<&str>;

    /// User a create payload will belong to once stored.
    fn create_owner(payload: &Self::Create) -> Option<&str>;

    fn wrap(items: Arc<Vec<Self>>) -> ResourceList;

    fn unwrap(list: &ResourceList) -> Option<Arc<Vec<Self>>>;
}

macro_rules! impl_resource {
    (@owner $value:expr, $field:ident) => {
        Some($value.$field.as_str())
    };
    (@owner $value:expr) => {
        None
    };
    ($ty:ty, $kind:ident, $create:ty, $patch:ty $(, owner = $field:ident)?) => {
        impl Resource for $ty {
            const KIND: ResourceKind = ResourceKind::$kind;
            type Create = $create;
            type Patch = $patch;

            fn id(&self) -> &str {
                &self.id
            }

            fn owner(&self) -> Option<&str> {
                impl_resource!(@owner self $(, $field)?)
            }

            fn create_owner(payload: &Self::Create) -> Option<&str> {
                impl_resource!(@owner payload $(, $field)?)
            }

            fn wrap(items: Arc<Vec<Self>>) -> ResourceList {
                ResourceList::$kind(items)
            }

            fn unwrap(list: &ResourceList) -> Option<Arc<Vec<Self>>> {
                match list {
                    ResourceList::$kind(items) => Some(Arc::clone(items)),
                    _ => None,
                }
            }
        }
    };
}

impl_resource!(WorkoutSession, Workouts, super::NewWorkout, super::WorkoutPatch, owner = user_id);
impl_resource!(Exercise, Exercises, super::NewExercise, super::ExercisePatch);
impl_resource!(NutritionEntry, Nutrition, super::NewNutritionEntry, super::NutritionPatch, owner = user_id);
impl_resource!(Measurement, Measurements, super::NewMeasurement, super::MeasurementPatch, owner = user_id);
