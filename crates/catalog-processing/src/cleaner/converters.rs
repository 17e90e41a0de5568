//! Typed-field coercion: `date_added` and `duration`.
//!
//! Neither conversion can fail. Malformed input is an expected case and is
//! represented with explicit markers while the original text is kept.

use crate::types::{CANONICAL_DATE_FORMAT, DateAdded};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static MINUTES_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(\d+)\s*mins?\s*$").expect("Invalid regex: minutes"));
static SEASONS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(\d+)\s*seasons?\s*$").expect("Invalid regex: seasons"));

/// Integer values derived from a duration string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParsedDuration {
    pub minutes: Option<u32>,
    pub seasons: Option<u32>,
}

/// Parse `date_added` against the accepted formats, first match wins.
///
/// The ISO form that cleaned records are written in is always accepted last,
/// so a cleaned date parses again whatever formats are configured.
pub fn parse_date_added(value: Option<&str>, formats: &[String]) -> DateAdded {
    let Some(text) = value.map(str::trim).filter(|t| !t.is_empty()) else {
        return DateAdded::Missing;
    };

    formats
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(CANONICAL_DATE_FORMAT))
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .map(DateAdded::Parsed)
        .unwrap_or_else(|| DateAdded::Unparsed(text.to_string()))
}

/// Extract minutes from `"<n> min"` or a season count from `"<n> Season(s)"`.
///
/// Anything else, including counts that overflow `u32`, yields no value.
pub fn parse_duration(value: &str) -> ParsedDuration {
    if let Some(minutes) = capture_count(&MINUTES_PATTERN, value) {
        return ParsedDuration {
            minutes: Some(minutes),
            seasons: None,
        };
    }

    ParsedDuration {
        minutes: None,
        seasons: capture_count(&SEASONS_PATTERN, value),
    }
}

fn capture_count(pattern: &Regex, value: &str) -> Option<u32> {
    pattern
        .captures(value)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
}
