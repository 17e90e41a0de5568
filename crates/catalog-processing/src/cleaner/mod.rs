//! Record cleaning stages.
//!
//! A record flows through a fixed sequence of stages:
//! 1. Missing-value substitution
//! 2. Text trimming
//! 3. Internal whitespace collapse
//! 4. Categorical canonicalization (list splitting + aliases)
//! 5. Title-case normalization
//! 6. Typed-field coercion (`date_added`, `duration`)
//!
//! Canonicalization runs before title casing because alias lookups are exact
//! and case-sensitive; title-casing first would turn `"USA"` into `"Usa"` and
//! the alias would never match.

mod canonical;
mod casing;
mod converters;
mod sanitizers;

pub use canonical::{canonicalize_value, normalize_list};
pub use casing::title_case;
pub use converters::{ParsedDuration, parse_date_added, parse_duration};
pub use sanitizers::{collapse_whitespace, normalize_whitespace, trim_text};

use crate::config::CleaningConfig;
use crate::error::{CleaningError, Result};
use crate::types::{CleanRecord, RawRecord, RecordTrace, TextField};
use sanitizers::{is_blank, substitute_missing};
use std::sync::Arc;
use tracing::trace;

/// Cleans individual records under a shared, read-only configuration.
///
/// Cleaning is a pure function of the record and the configuration; the
/// cleaner holds no per-record state and can be shared across threads.
#[derive(Debug, Clone)]
pub struct RecordCleaner {
    config: Arc<CleaningConfig>,
}

static_assertions::assert_impl_all!(RecordCleaner: Send, Sync);

impl RecordCleaner {
    pub fn new(config: Arc<CleaningConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Clean one record.
    ///
    /// `index` is the record's position in its batch and only used to
    /// identify the record in a rejection.
    pub fn clean(&self, index: usize, raw: &RawRecord) -> Result<CleanRecord> {
        self.clean_traced(index, raw).map(|(record, _)| record)
    }

    /// Clean one record and report what the stages changed.
    pub fn clean_traced(&self, index: usize, raw: &RawRecord) -> Result<(CleanRecord, RecordTrace)> {
        if is_blank(raw.id.as_deref()) {
            return Err(CleaningError::MissingRequiredField { index, field: "id" });
        }

        let mut record = raw.clone();
        let mut trace = RecordTrace::default();

        // Stage 1: missing values
        substitute_missing(&mut record, &self.config.missing_values, &mut trace);

        // Stages 2-3: trim and collapse
        for field in TextField::ALL {
            let slot = record.slot_mut(field);
            if let Some(value) = slot.as_deref() {
                *slot = Some(normalize_whitespace(value));
            }
        }

        // Stage 4: canonicalization
        for field in TextField::ALL {
            let aliases = self.config.aliases_for(field);
            if !field.is_list() && aliases.is_none() {
                continue;
            }
            let slot = record.slot_mut(field);
            let Some(value) = slot.as_deref() else {
                continue;
            };
            let (canonical, rewritten) = match (field.is_list(), aliases) {
                (true, aliases) => normalize_list(value, aliases),
                (false, Some(table)) => {
                    let (canonical, changed) = canonicalize_value(value, table);
                    (canonical, usize::from(changed))
                }
                (false, None) => continue,
            };
            *slot = Some(canonical).filter(|v| !v.is_empty());
            trace.aliases_rewritten += rewritten;
        }

        // A list made only of delimiters is empty now
        substitute_missing(&mut record, &self.config.missing_values, &mut trace);

        // Stage 5: title case
        for field in TextField::TITLE_CASED {
            let slot = record.slot_mut(field);
            if let Some(value) = slot.as_deref() {
                *slot = Some(title_case(value));
            }
        }

        // Stage 6: typed coercion
        let date_added = parse_date_added(record.date_added.as_deref(), &self.config.date_formats);
        let duration = record.duration.take().unwrap_or_default();
        let parsed = parse_duration(&duration);

        trace!(index, id = ?record.id, "record cleaned");

        let clean = CleanRecord {
            id: record.id.take().unwrap_or_default(),
            kind: record.kind.take().unwrap_or_default(),
            title: record.title.take().unwrap_or_default(),
            director: record.director.take().unwrap_or_default(),
            cast: record.cast.take().unwrap_or_default(),
            country: record.country.take().unwrap_or_default(),
            date_added,
            release_year: record.release_year,
            rating: record.rating.take().unwrap_or_default(),
            duration,
            duration_minutes: parsed.minutes,
            season_count: parsed.seasons,
            genres: record.genres.take().unwrap_or_default(),
            description: record.description.take().unwrap_or_default(),
        };

        Ok((clean, trace))
    }
}
