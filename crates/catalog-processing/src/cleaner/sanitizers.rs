//! Missing-value substitution and whitespace sanitization.

use crate::types::{RawRecord, RecordTrace, TextField};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s{2,}|[\t\r\n\x0B\x0C]").expect("Invalid regex: whitespace run"));

/// Whether a value is absent for cleaning purposes (`None` or only whitespace).
pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Replace absent fields with their configured defaults.
///
/// Fields without a configured default are left untouched.
pub(crate) fn substitute_missing(
    record: &mut RawRecord,
    defaults: &BTreeMap<TextField, String>,
    trace: &mut RecordTrace,
) {
    for (field, default) in defaults {
        let slot = record.slot_mut(*field);
        if is_blank(slot.as_deref()) {
            *slot = Some(default.clone());
            trace.defaults_applied.push(*field);
        }
    }
}

/// Remove leading and trailing whitespace.
pub fn trim_text(value: &str) -> &str {
    value.trim()
}

/// Collapse every interior whitespace run to a single space in one pass.
pub fn collapse_whitespace(value: &str) -> String {
    WHITESPACE_RUN.replace_all(value, " ").into_owned()
}

/// Trim, then collapse interior whitespace.
pub fn normalize_whitespace(value: &str) -> String {
    collapse_whitespace(trim_text(value))
}
