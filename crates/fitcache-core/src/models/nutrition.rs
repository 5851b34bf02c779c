use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::validate::{self, Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionEntry {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub meal_type: String,
    #[serde(default)]
    pub food_items: Vec<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamins: Option<BTreeMap<String, f64>>,
}

impl NutritionEntry {
    /// Calendar day part of `date`, for grouping.
    pub fn day(&self) -> &str {
        crate::utils::day_key(&self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNutritionEntry {
    pub user_id: String,
    pub date: String,
    pub meal_type: String,
    pub food_items: Vec<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vitamins: Option<BTreeMap<String, f64>>,
}

impl Validate for NewNutritionEntry {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::non_empty("userId", &self.user_id)?;
        validate::date("date", &self.date)?;
        validate::non_empty("mealType", &self.meal_type)?;
        if self.food_items.iter().any(|item| item.trim().is_empty()) {
            return Err(ValidationError::new("foodItems", "items must not be blank"));
        }
        check_macros(
            Some(self.calories),
            Some(self.protein),
            Some(self.carbs),
            Some(self.fats),
            self.sugar,
        )?;
        check_vitamins(self.vitamins.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_items: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fats: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vitamins: Option<BTreeMap<String, f64>>,
}

impl Validate for NutritionPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if *self == Self::default() {
            return Err(ValidationError::new("patch", "no fields to update"));
        }
        if let Some(ref date) = self.date {
            validate::date("date", date)?;
        }
        if let Some(ref meal_type) = self.meal_type {
            validate::non_empty("mealType", meal_type)?;
        }
        check_macros(self.calories, self.protein, self.carbs, self.fats, self.sugar)?;
        check_vitamins(self.vitamins.as_ref())
    }
}

fn check_macros(
    calories: Option<f64>,
    protein: Option<f64>,
    carbs: Option<f64>,
    fats: Option<f64>,
    sugar: Option<f64>,
) -> Result<(), ValidationError> {
    validate::non_negative_opt("calories", calories)?;
    validate::non_negative_opt("protein", protein)?;
    validate::non_negative_opt("carbs", carbs)?;
    validate::non_negative_opt("fats", fats)?;
    validate::non_negative_opt("sugar", sugar)
}

fn check_vitamins(vitamins: Option<&BTreeMap<String, f64>>) -> Result<(), ValidationError> {
    for amount in vitamins.into_iter().flat_map(|v| v.values()) {
        validate::non_negative("vitamins", *amount)?;
    }
    Ok(())
}
