//! Display helpers for the list and detail views.

use chrono::{DateTime, Duration, Utc};

use crate::codec::ValueType;

const SECONDS_IN_MINUTE: i64 = 60;
const SECONDS_IN_HOUR: i64 = 3600;
const SECONDS_IN_DAY: i64 = 86_400;

/// Character budget for values in the list table.
pub const VALUE_PREVIEW_CHARS: usize = 50;

/// Human-friendly age of `date` relative to `now`.
///
/// Under a minute is `now`, then minutes, then hours. Past a day, the
/// previous calendar day reads `yesterday` and anything older is a short
/// `Mon D, YYYY` date. Calendar days are UTC days.
pub fn format_relative(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - date).num_seconds();

    if diff < SECONDS_IN_MINUTE {
        return "now".to_string();
    }
    if diff < SECONDS_IN_HOUR {
        let minutes = diff / SECONDS_IN_MINUTE;
        return format!("{minutes} minute{} ago", plural(minutes));
    }
    if diff < SECONDS_IN_DAY {
        let hours = diff / SECONDS_IN_HOUR;
        return format!("{hours} hour{} ago", plural(hours));
    }

    let yesterday = (now - Duration::days(1)).date_naive();
    if date.date_naive() == yesterday {
        "yesterday".to_string()
    } else {
        format_short_date(date)
    }
}

/// `Jan 5, 2024` style date.
pub fn format_short_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Cut `value` to the list preview budget, appending `...` when shortened.
pub fn truncate_value(value: &str) -> String {
    truncate_chars(value, VALUE_PREVIEW_CHARS)
}

pub fn truncate_chars(value: &str, budget: usize) -> String {
    match value.char_indices().nth(budget) {
        Some((idx, _)) => format!("{}...", &value[..idx]),
        None => value.to_string(),
    }
}

/// Fixed-width tag for the type column.
pub fn type_badge(value_type: ValueType) -> String {
    format!("[{:<5}]", value_type.wire_name())
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
