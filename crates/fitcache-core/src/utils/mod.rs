//! Utility functions for display formatting.

pub mod format;

pub use format::{day_key, format_date, format_duration, format_optional, today_key, truncate_string};
