//! Textual literal forms shared by the XML reader and the coercion engine

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// ISO date format (`YYYY-MM-DD`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// ISO time format (`HH:MM:SS`)
pub const TIME_FORMAT: &str = "%H:%M:%S";
/// ISO datetime format without timezone
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

static TUPLE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\((.*)\)\s*$").unwrap());

static INT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+$").unwrap());

/// Parse a boolean, accepting `true`/`false` in any letter case
pub fn parse_boolean(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

pub fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    if INT_REGEX.is_match(text) {
        text.parse().ok()
    } else {
        None
    }
}

pub fn parse_float(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

pub fn parse_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), TIME_FORMAT).ok()
}

/// Parse a datetime with either a `T` or a space between date and time
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

/// Split a tuple literal `(v1; v2; ...; vn)` into its trimmed components
///
/// Returns `None` unless the text is parenthesized and has at least two
/// components.
///
/// # Example
///
/// ```rust
/// use nix_odml_converter::models::literal::parse_tuple;
///
/// assert_eq!(parse_tuple("(1; 2)"), Some(vec!["1".to_string(), "2".to_string()]));
/// assert_eq!(parse_tuple("1; 2"), None);
/// ```
pub fn parse_tuple(text: &str) -> Option<Vec<String>> {
    let inner = TUPLE_REGEX.captures(text)?.get(1)?.as_str();
    let components: Vec<String> = inner.split(';').map(|c| c.trim().to_string()).collect();
    if components.len() >= 2 {
        Some(components)
    } else {
        None
    }
}

/// Render tuple components in the canonical `(v1; v2)` form
pub fn format_tuple<S: AsRef<str>>(components: &[S]) -> String {
    let joined: Vec<&str> = components.iter().map(|c| c.as_ref()).collect();
    format!("({})", joined.join("; "))
}
