//! Shared utilities for the catalog pipeline and its consumers.

/// Delimiter used when list fields are rewritten.
pub const LIST_SEPARATOR: &str = ", ";

/// Split a comma-separated list field into trimmed, non-empty atoms.
///
/// Consumers use this to expand `country`, `cast`, `director` or `genres`
/// into individual values for per-atom aggregation.
///
/// # Example
///
/// ```rust
/// use catalog_processing::utils::split_list;
///
/// let countries: Vec<&str> = split_list("France, , Belgium").collect();
/// assert_eq!(countries, vec!["France", "Belgium"]);
/// ```
pub fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|token| !token.is_empty())
}

/// Truncate a string to `max_chars` characters, appending `...` when cut.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}
