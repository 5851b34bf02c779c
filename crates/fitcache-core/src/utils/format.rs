/// Format a workout duration given in minutes, e.g. "1h 15m"
pub fn format_duration(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional measurement with its unit, or a placeholder when absent
pub fn format_optional(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("{}{}", v, unit),
        Some(v) => format!("{:.1}{}", v, unit),
        None => "-".to_string(),
    }
}

/// Calendar-day part (`YYYY-MM-DD`) of a stored date or timestamp.
///
/// Dates are stamped with the UTC day when created, so this never shifts
/// timestamps into a local zone.
pub fn day_key(date: &str) -> &str {
    date.get(..10).unwrap_or(date)
}

/// Today's `YYYY-MM-DD` key, in the same UTC calendar the backend stamps entries with.
pub fn today_key() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if let Ok(d) = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        d.format("%b %d, %Y").to_string()
    } else {
        date.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_key() {
        assert_eq!(day_key("2024-05-27T23:30:00.000Z"), "2024-05-27");
        assert_eq!(day_key("2024-05-27"), "2024-05-27");
        assert_eq!(day_key("May 27"), "May 27");
        assert_eq!(today_key().len(), 10);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "45m");
        assert_eq!(format_duration(60), "1h");
        assert_eq!(format_duration(75), "1h 15m");
        assert_eq!(format_duration(0), "0m");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Oatmeal", 10), "Oatmeal");
        assert_eq!(truncate_string("Grilled Chicken", 10), "Grilled...");
        assert_eq!(truncate_string("Rice", 2), "Ri");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(Some(78.0), " kg"), "78 kg");
        assert_eq!(format_optional(Some(18.26), "%"), "18.3%");
        assert_eq!(format_optional(None, " cm"), "-");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-05-27"), "May 27, 2024");
        assert_eq!(format_date("2024-05-27T07:00:00Z"), "May 27, 2024");
        assert_eq!(format_date("someday"), "someday");
    }
}
