//! Categorical canonicalization and list-field normalization.
//!
//! List fields are split on `,` before aliases are looked up, so every token
//! of a multi-country record is canonicalized, not only the first one.
//! Lookups are exact and case-sensitive.

use crate::config::AliasTable;
use crate::utils::{LIST_SEPARATOR, split_list};

/// Rewrite a whole value through an alias table.
///
/// Returns the canonical value and whether a rewrite happened.
pub fn canonicalize_value(value: &str, aliases: &AliasTable) -> (String, bool) {
    match aliases.get(value) {
        Some(canonical) => (canonical.clone(), true),
        None => (value.to_string(), false),
    }
}

/// Normalize a comma-separated list: trim tokens, drop empty ones, apply
/// aliases per token and rejoin with `", "`.
///
/// Returns the normalized list and the number of tokens rewritten.
pub fn normalize_list(value: &str, aliases: Option<&AliasTable>) -> (String, usize) {
    let mut rewritten = 0;
    let tokens: Vec<String> = split_list(value)
        .map(|token| match aliases {
            Some(table) => {
                let (canonical, changed) = canonicalize_value(token, table);
                if changed {
                    rewritten += 1;
                }
                canonical
            }
            None => token.to_string(),
        })
        .collect();

    (tokens.join(LIST_SEPARATOR), rewritten)
}
