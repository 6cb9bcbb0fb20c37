//! # Formatting Helpers
//!
//! Small pure functions shared by the store and the renderers.

use chrono::{DateTime, Local, Utc};

/// Marker appended to truncated text.
pub const ELLIPSIS: &str = "...";

/// Truncate `text` to at most `max_chars` characters, ending in `...` when cut.
///
/// Counts chars, not bytes, so CJK titles never split inside a code point.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Collapse runs of whitespace (including newlines) into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Local wall-clock time as `HH:MM`.
pub fn format_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M").to_string()
}

/// Join the parts that are present and non-empty with `sep`.
pub fn join_present<'a>(parts: impl IntoIterator<Item = Option<&'a str>>, sep: &str) -> String {
    parts
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Format a float with fixed digits, `--` for NaN or infinity.
pub fn format_number(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return "--".to_string();
    }
    format!("{value:.digits$}")
}
