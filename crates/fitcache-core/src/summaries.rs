//! Daily nutrition totals and workout statistics.
//!
//! These are computed from cached collections for dashboard-style views; they
//! never touch the network.

use serde::{Deserialize, Serialize};

use crate::models::{NutritionEntry, WorkoutSession};

/// Default daily targets: 2000 kcal, 150 g protein, 250 g carbs, 65 g fats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyGoals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl Default for DailyGoals {
    fn default() -> Self {
        Self {
            calories: 2000.0,
            protein: 150.0,
            carbs: 250.0,
            fats: 65.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NutritionTotals {
    pub meals: usize,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub sugar: f64,
}

impl NutritionTotals {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a NutritionEntry>) -> Self {
        entries.into_iter().fold(Self::default(), |mut totals, entry| {
            totals.meals += 1;
            totals.calories += entry.calories;
            totals.protein += entry.protein;
            totals.carbs += entry.carbs;
            totals.fats += entry.fats;
            totals.sugar += entry.sugar.unwrap_or(0.0);
            totals
        })
    }

    /// Totals for one calendar day (`YYYY-MM-DD`).
    pub fn for_date(entries: &[NutritionEntry], day: &str) -> Self {
        Self::from_entries(entries.iter().filter(|e| e.day() == day))
    }

    /// Percent of each goal reached; values above 100 mean the goal was exceeded.
    pub fn progress(&self, goals: &DailyGoals) -> MacroProgress {
        MacroProgress {
            calories: percent(self.calories, goals.calories),
            protein: percent(self.protein, goals.protein),
            carbs: percent(self.carbs, goals.carbs),
            fats: percent(self.fats, goals.fats),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroProgress {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

fn percent(value: f64, goal: f64) -> f64 {
    if goal <= 0.0 {
        0.0
    } else {
        value / goal * 100.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkoutStats {
    pub sessions: usize,
    pub total_minutes: u32,
    pub calories_burned: u32,
    pub total_sets: u32,
}

impl WorkoutStats {
    pub fn from_sessions<'a>(sessions: impl IntoIterator<Item = &'a WorkoutSession>) -> Self {
        sessions.into_iter().fold(Self::default(), |mut stats, session| {
            // Server-supplied values; saturate instead of overflowing
            stats.sessions += 1;
            stats.total_minutes = stats.total_minutes.saturating_add(session.duration.unwrap_or(0));
            stats.calories_burned = stats
                .calories_burned
                .saturating_add(session.calories_burned.unwrap_or(0));
            stats.total_sets = stats.total_sets.saturating_add(session.total_sets());
            stats
        })
    }

    /// Stats for sessions on one calendar day (`YYYY-MM-DD`).
    pub fn for_date(sessions: &[WorkoutSession], day: &str) -> Self {
        Self::from_sessions(sessions.iter().filter(|s| s.day() == day))
    }
}

/// Split a comma-separated food list as typed into a meal form.
pub fn parse_food_items(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
