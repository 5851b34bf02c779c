//! fitcache - terminal reader for fitness tracker data.
//!
//! Loads the configured backend and user, reads collections through the
//! `QueryCache`, and prints them as plain rows. `log-meal` writes a nutrition
//! entry for today and `config` views or edits the saved configuration.

use std::io;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fitcache_core::models::{Exercise, Measurement, NewNutritionEntry, NutritionEntry, WorkoutSession};
use fitcache_core::summaries::{parse_food_items, DailyGoals, NutritionTotals, WorkoutStats};
use fitcache_core::utils::{format_date, format_duration, format_optional, today_key, truncate_string};
use fitcache_core::{Config, QueryCache, QueryKey};

// ============================================================================
// Constants
// ============================================================================

/// Width of free-text columns (notes, food items)
const TEXT_COLUMN_WIDTH: usize = 40;

const USAGE: &str = "\
usage: fitcache [workouts|exercises|nutrition|measurements|today]
       fitcache log-meal <meal-type> <calories> <protein> <carbs> <fats> <food, items...>
       fitcache config [user <id> | url <base-url>]";

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Workouts,
    Exercises,
    Nutrition,
    Measurements,
    Today,
    LogMeal(MealArgs),
    ShowConfig,
    SetUser(String),
    SetUrl(String),
}

impl Command {
    /// Parse the arguments after the program name.
    fn parse(args: &[String]) -> Result<Self> {
        Ok(match args.first().map(String::as_str) {
            None | Some("today") => Command::Today,
            Some("workouts") => Command::Workouts,
            Some("exercises") => Command::Exercises,
            Some("nutrition") => Command::Nutrition,
            Some("measurements") => Command::Measurements,
            Some("log-meal") => Command::LogMeal(MealArgs::parse(&args[1..])?),
            Some("config") => match (args.get(1).map(String::as_str), args.get(2)) {
                (None, _) => Command::ShowConfig,
                (Some("user"), Some(id)) => Command::SetUser(id.clone()),
                (Some("url"), Some(url)) => Command::SetUrl(url.clone()),
                _ => bail!("config expects 'user <id>' or 'url <base-url>'\n{}", USAGE),
            },
            Some(other) => bail!("unknown command '{}'\n{}", other, USAGE),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct MealArgs {
    meal_type: String,
    calories: f64,
    protein: f64,
    carbs: f64,
    fats: f64,
    food_items: Vec<String>,
}

impl MealArgs {
    fn parse(args: &[String]) -> Result<Self> {
        if args.len() < 6 {
            bail!("log-meal needs a meal type, four numbers and the food items\n{}", USAGE);
        }
        let number = |index: usize, name: &str| -> Result<f64> {
            args[index]
                .parse::<f64>()
                .with_context(|| format!("{} must be a number (got '{}')", name, args[index]))
        };
        Ok(Self {
            meal_type: args[0].clone(),
            calories: number(1, "calories")?,
            protein: number(2, "protein")?,
            carbs: number(3, "carbs")?,
            fats: number(4, "fats")?,
            food_items: parse_food_items(&args[5..].join(" ")),
        })
    }

    fn into_entry(self, user_id: &str, date: String) -> NewNutritionEntry {
        NewNutritionEntry {
            user_id: user_id.to_string(),
            date,
            meal_type: self.meal_type,
            food_items: self.food_items,
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fats: self.fats,
            sugar: None,
            vitamins: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("{}", USAGE);
        return Ok(());
    }
    match Command::parse(&args)? {
        Command::ShowConfig => show_config(),
        Command::SetUser(id) => update_config(|config| config.user_id = Some(id)),
        Command::SetUrl(url) => update_config(|config| config.api_base_url = url),
        command => run(command).await,
    }
}

/// Commands that talk to the backend through the cache.
async fn run(command: Command) -> Result<()> {
    let config = Config::load()?;
    let user_id = config.user_id()?.to_string();
    let cache = QueryCache::new(config.api_client()?, config.cache_options()?);
    info!(api = %config.api_base_url, user_id = %user_id, ?command, "fitcache starting");

    match command {
        Command::Workouts => print_workouts(&cache, &user_id).await,
        Command::Exercises => print_exercises(&cache, &user_id).await,
        Command::Nutrition => print_nutrition(&cache, &user_id).await,
        Command::Measurements => print_measurements(&cache, &user_id).await,
        Command::Today => print_today(&cache, &user_id).await,
        Command::LogMeal(meal) => {
            let entry = meal.into_entry(&user_id, today_key());
            let created = cache
                .create::<NutritionEntry>(&user_id, entry)
                .await
                .context("Failed to log meal")?;
            println!(
                "Logged {} ({} kcal): {}",
                created.meal_type,
                created.calories,
                created.food_items.join(", ")
            );
            print_today(&cache, &user_id).await;
        }
        Command::ShowConfig | Command::SetUser(_) | Command::SetUrl(_) => {}
    }

    Ok(())
}

fn show_config() -> Result<()> {
    let config = Config::load()?;
    println!("Config file   {}", Config::config_path()?.display());
    println!("API           {}", config.api_base_url);
    println!("User          {}", config.user_id.as_deref().unwrap_or("(not set)"));
    println!(
        "Timeout       {}",
        config
            .request_timeout_secs
            .map(|s| format!("{}s", s))
            .unwrap_or_else(|| "transport default".to_string())
    );
    println!(
        "Stale after   {}",
        config
            .stale_after_minutes
            .map(|m| format_duration(u32::try_from(m).unwrap_or(u32::MAX)))
            .unwrap_or_else(|| "never".to_string())
    );
    Ok(())
}

/// Edit the saved file only; environment overrides are not written back.
fn update_config(edit: impl FnOnce(&mut Config)) -> Result<()> {
    let path = Config::config_path()?;
    let mut config = Config::load_from(&path)?;
    edit(&mut config);
    // Reject a bad base URL before it is saved
    config.api_client()?;
    config.save_to(&path)?;
    println!("Saved {}", path.display());
    Ok(())
}

/// Print a failed collection in place of its rows.
fn print_error(what: &str, err: &fitcache_core::ApiError) {
    println!("  Error loading {}: {}", what, err);
}

fn print_age<R: fitcache_core::models::Resource>(cache: &QueryCache, user_id: &str) {
    if let Some(age) = cache.cached_age(&QueryKey::of::<R>(user_id)) {
        println!("  (updated {})", age);
    }
}

async fn print_workouts(cache: &QueryCache, user_id: &str) {
    println!("Workouts");
    match cache.fetch::<WorkoutSession>(user_id).await {
        Ok(sessions) if sessions.is_empty() => println!("  No workouts logged yet"),
        Ok(sessions) => {
            for session in sessions.iter() {
                println!(
                    "  {:<14} {:>8} {:>8} {:>3} sets  {}",
                    format_date(&session.date),
                    session.duration.map(format_duration).unwrap_or_else(|| "-".to_string()),
                    session
                        .calories_burned
                        .map(|c| format!("{} kcal", c))
                        .unwrap_or_else(|| "-".to_string()),
                    session.total_sets(),
                    truncate_string(session.notes.as_deref().unwrap_or(""), TEXT_COLUMN_WIDTH),
                );
            }
            print_age::<WorkoutSession>(cache, user_id);
        }
        Err(e) => print_error("workouts", &e),
    }
}

async fn print_exercises(cache: &QueryCache, user_id: &str) {
    println!("Exercises");
    match cache.fetch::<Exercise>(user_id).await {
        Ok(exercises) if exercises.is_empty() => println!("  No exercises in the library"),
        Ok(exercises) => {
            for exercise in exercises.iter() {
                println!(
                    "  {:<24} {:<12} {}",
                    truncate_string(&exercise.name, 24),
                    exercise.category,
                    exercise.exercise_type
                );
            }
            print_age::<Exercise>(cache, user_id);
        }
        Err(e) => print_error("exercises", &e),
    }
}

async fn print_nutrition(cache: &QueryCache, user_id: &str) {
    println!("Nutrition");
    match cache.fetch::<NutritionEntry>(user_id).await {
        Ok(entries) if entries.is_empty() => println!("  No meals logged yet"),
        Ok(entries) => {
            for entry in entries.iter() {
                println!(
                    "  {:<14} {:<10} {:>6} kcal  P {:>5} C {:>5} F {:>5}  {}",
                    format_date(&entry.date),
                    entry.meal_type,
                    entry.calories,
                    format_optional(Some(entry.protein), "g"),
                    format_optional(Some(entry.carbs), "g"),
                    format_optional(Some(entry.fats), "g"),
                    truncate_string(&entry.food_items.join(", "), TEXT_COLUMN_WIDTH),
                );
            }
            print_age::<NutritionEntry>(cache, user_id);
        }
        Err(e) => print_error("nutrition", &e),
    }
}

async fn print_measurements(cache: &QueryCache, user_id: &str) {
    println!("Measurements");
    match cache.fetch::<Measurement>(user_id).await {
        Ok(measurements) if measurements.is_empty() => println!("  No measurements recorded yet"),
        Ok(measurements) => {
            for m in measurements.iter() {
                println!(
                    "  {:<14} weight {:>7}  body fat {:>6}  waist {:>7}  chest {:>7}  arm {:>7}",
                    format_date(&m.date),
                    format_optional(m.weight, "kg"),
                    format_optional(m.body_fat, "%"),
                    format_optional(m.waist, "cm"),
                    format_optional(m.chest, "cm"),
                    format_optional(m.arm, "cm"),
                );
            }
            print_age::<Measurement>(cache, user_id);
        }
        Err(e) => print_error("measurements", &e),
    }
}

async fn print_today(cache: &QueryCache, user_id: &str) {
    let today = today_key();
    println!("Today ({})", format_date(&today));

    // Both collections load concurrently through the cache
    let (nutrition, workouts) = tokio::join!(
        cache.fetch::<NutritionEntry>(user_id),
        cache.fetch::<WorkoutSession>(user_id),
    );

    println!("Nutrition");
    match nutrition {
        Ok(entries) => {
            let goals = DailyGoals::default();
            let totals = NutritionTotals::for_date(&entries, &today);
            let progress = totals.progress(&goals);
            println!("  Meals     {}", totals.meals);
            println!(
                "  Calories  {:>7.0} / {:.0} kcal ({:.0}%)",
                totals.calories,
                goals.calories,
                progress.calories.min(100.0)
            );
            println!(
                "  Protein   {:>7.1} / {:.0} g ({:.0}%)",
                totals.protein,
                goals.protein,
                progress.protein.min(100.0)
            );
            println!(
                "  Carbs     {:>7.1} / {:.0} g ({:.0}%)",
                totals.carbs,
                goals.carbs,
                progress.carbs.min(100.0)
            );
            println!(
                "  Fats      {:>7.1} / {:.0} g ({:.0}%)",
                totals.fats,
                goals.fats,
                progress.fats.min(100.0)
            );
        }
        Err(e) => print_error("nutrition", &e),
    }

    println!("Workouts");
    match workouts {
        Ok(sessions) => {
            let stats = WorkoutStats::for_date(&sessions, &today);
            let all_time = WorkoutStats::from_sessions(sessions.iter());
            println!(
                "  Today     {} sessions, {}, {} kcal, {} sets",
                stats.sessions,
                format_duration(stats.total_minutes),
                stats.calories_burned,
                stats.total_sets
            );
            println!(
                "  All time  {} sessions, {}, {} kcal",
                all_time.sessions,
                format_duration(all_time.total_minutes),
                all_time.calories_burned
            );
        }
        Err(e) => print_error("workouts", &e),
    }
}
