use chrono::NaiveDate;

/// Case-insensitive substring check. An empty needle always matches.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Human label for an appointment date, e.g. "Oct 16 (Thu)"
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%b %d (%a)").to_string()
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
