use crate::error::CleaningError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Date representation used when a parsed `date_added` is written back out.
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Catalog Fields
// ============================================================================

/// Text-valued fields of a catalog record.
///
/// Used to key default values, alias tables and summary counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    Id,
    Kind,
    Title,
    Director,
    Cast,
    Country,
    DateAdded,
    Rating,
    Duration,
    Genres,
    Description,
}

impl TextField {
    /// Every text field, in record order.
    pub const ALL: [TextField; 11] = [
        Self::Id,
        Self::Kind,
        Self::Title,
        Self::Director,
        Self::Cast,
        Self::Country,
        Self::DateAdded,
        Self::Rating,
        Self::Duration,
        Self::Genres,
        Self::Description,
    ];

    /// Comma-separated, multi-valued fields.
    pub const LIST_FIELDS: [TextField; 4] = [Self::Director, Self::Cast, Self::Country, Self::Genres];

    /// Fields rewritten word-by-word in title case.
    pub const TITLE_CASED: [TextField; 5] = [
        Self::Country,
        Self::Title,
        Self::Cast,
        Self::Director,
        Self::Genres,
    ];

    /// Snake-case field name, as used in config files and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Kind => "kind",
            Self::Title => "title",
            Self::Director => "director",
            Self::Cast => "cast",
            Self::Country => "country",
            Self::DateAdded => "date_added",
            Self::Rating => "rating",
            Self::Duration => "duration",
            Self::Genres => "genres",
            Self::Description => "description",
        }
    }

    /// Whether the field holds a comma-separated list of names.
    pub fn is_list(&self) -> bool {
        Self::LIST_FIELDS.contains(self)
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Records
// ============================================================================

/// One catalog entry as ingested.
///
/// Every text field may be absent. A value that is blank after trimming is
/// treated as absent by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: Option<String>,
    pub kind: Option<String>,
    pub title: Option<String>,
    pub director: Option<String>,
    pub cast: Option<String>,
    pub country: Option<String>,
    pub date_added: Option<String>,
    pub release_year: Option<u16>,
    pub rating: Option<String>,
    pub duration: Option<String>,
    pub genres: Option<String>,
    pub description: Option<String>,
}

impl RawRecord {
    /// Create a record carrying only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Set a text field, returning the record (handy for fixtures).
    pub fn with(mut self, field: TextField, value: impl Into<String>) -> Self {
        *self.slot_mut(field) = Some(value.into());
        self
    }

    /// Set the release year.
    pub fn with_release_year(mut self, year: u16) -> Self {
        self.release_year = Some(year);
        self
    }

    /// Read a text field.
    pub fn get(&self, field: TextField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    fn slot(&self, field: TextField) -> &Option<String> {
        match field {
            TextField::Id => &self.id,
            TextField::Kind => &self.kind,
            TextField::Title => &self.title,
            TextField::Director => &self.director,
            TextField::Cast => &self.cast,
            TextField::Country => &self.country,
            TextField::DateAdded => &self.date_added,
            TextField::Rating => &self.rating,
            TextField::Duration => &self.duration,
            TextField::Genres => &self.genres,
            TextField::Description => &self.description,
        }
    }

    pub(crate) fn slot_mut(&mut self, field: TextField) -> &mut Option<String> {
        match field {
            TextField::Id => &mut self.id,
            TextField::Kind => &mut self.kind,
            TextField::Title => &mut self.title,
            TextField::Director => &mut self.director,
            TextField::Cast => &mut self.cast,
            TextField::Country => &mut self.country,
            TextField::DateAdded => &mut self.date_added,
            TextField::Rating => &mut self.rating,
            TextField::Duration => &mut self.duration,
            TextField::Genres => &mut self.genres,
            TextField::Description => &mut self.description,
        }
    }
}

/// Outcome of parsing the free-text `date_added` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum DateAdded {
    /// Parsed under one of the accepted formats.
    Parsed(NaiveDate),
    /// Present but matched none of the accepted formats; original text kept.
    Unparsed(String),
    /// Absent in the source record.
    Missing,
}

impl DateAdded {
    /// The calendar date, if parsing succeeded.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Parsed(date) => Some(*date),
            _ => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }

    /// Text form: ISO date when parsed, original text when unparsed,
    /// `None` when missing.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Parsed(date) => Some(date.format(CANONICAL_DATE_FORMAT).to_string()),
            Self::Unparsed(original) => Some(original.clone()),
            Self::Missing => None,
        }
    }
}

/// A normalized catalog entry.
///
/// Invariants: no text field has leading/trailing whitespace or interior
/// runs of spaces; defaulted fields are never empty; list fields use `", "`
/// as delimiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanRecord {
    pub id: String,
    pub kind: String,
    pub title: String,
    pub director: String,
    pub cast: String,
    pub country: String,
    pub date_added: DateAdded,
    pub release_year: Option<u16>,
    pub rating: String,
    pub duration: String,
    /// Running time in minutes, from `"<n> min"`.
    pub duration_minutes: Option<u32>,
    /// Number of seasons, from `"<n> Season"` / `"<n> Seasons"`.
    pub season_count: Option<u32>,
    pub genres: String,
    pub description: String,
}

impl CleanRecord {
    /// Read a text field. `date_added` yields its text form.
    pub fn text(&self, field: TextField) -> Option<String> {
        let value = match field {
            TextField::Id => &self.id,
            TextField::Kind => &self.kind,
            TextField::Title => &self.title,
            TextField::Director => &self.director,
            TextField::Cast => &self.cast,
            TextField::Country => &self.country,
            TextField::DateAdded => return self.date_added.to_text(),
            TextField::Rating => &self.rating,
            TextField::Duration => &self.duration,
            TextField::Genres => &self.genres,
            TextField::Description => &self.description,
        };
        Some(value.clone())
    }

    /// Convert back into the raw input shape, so a clean record can be fed
    /// through the pipeline again.
    pub fn to_raw(&self) -> RawRecord {
        let mut raw = RawRecord {
            release_year: self.release_year,
            ..RawRecord::default()
        };
        for field in TextField::ALL {
            *raw.slot_mut(field) = self.text(field);
        }
        raw
    }
}

// ============================================================================
// Per-record trace and batch outcome
// ============================================================================

/// What the cleaning stages did to a single record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTrace {
    /// Fields that received their configured default.
    pub defaults_applied: Vec<TextField>,
    /// Number of list tokens rewritten through an alias table.
    pub aliases_rewritten: usize,
}

/// A record the pipeline refused to clean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRejection {
    /// Position of the record in the input batch (0-based).
    pub index: usize,
    /// Id of the record, when one was present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Field that caused the rejection, if attributable to one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Stable error code.
    pub code: String,
    /// Human-readable reason.
    pub message: String,
}

impl RecordRejection {
    pub fn from_error(index: usize, id: Option<String>, error: &CleaningError) -> Self {
        let field = match error {
            CleaningError::MissingRequiredField { field, .. } => Some(field.to_string()),
            _ => None,
        };
        Self {
            index,
            id,
            field,
            code: error.error_code().to_string(),
            message: error.to_string(),
        }
    }
}

/// Result of running the pipeline over a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Cleaned records, in input order (rejected records omitted).
    pub records: Vec<CleanRecord>,
    /// Records that failed validation.
    pub rejections: Vec<RecordRejection>,
    /// Counters describing the run.
    pub summary: CleaningSummary,
}

impl BatchOutcome {
    /// Whether every input record was cleaned.
    pub fn is_complete(&self) -> bool {
        self.rejections.is_empty()
    }
}

// ============================================================================
// Cleaning Summary
// ============================================================================

/// Human-readable summary of what a pipeline run did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    /// Number of records handed to the pipeline.
    pub records_in: usize,
    /// Number of records cleaned.
    pub records_cleaned: usize,
    /// Number of records rejected.
    pub records_rejected: usize,

    /// Default substitutions per field.
    pub defaults_substituted: BTreeMap<TextField, usize>,
    /// List tokens rewritten through alias tables.
    pub aliases_rewritten: usize,

    pub dates_parsed: usize,
    pub dates_unparsed: usize,
    pub dates_missing: usize,

    /// Durations that yielded minutes or a season count.
    pub durations_parsed: usize,
    /// Durations kept as text only.
    pub durations_unparsed: usize,

    /// Warnings and notes generated during the run.
    pub warnings: Vec<String>,
}

impl CleaningSummary {
    /// Create a new empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one cleaned record into the counters.
    pub fn record(&mut self, record: &CleanRecord, trace: &RecordTrace) {
        self.records_cleaned += 1;
        for field in &trace.defaults_applied {
            *self.defaults_substituted.entry(*field).or_insert(0) += 1;
        }
        self.aliases_rewritten += trace.aliases_rewritten;

        match record.date_added {
            DateAdded::Parsed(_) => self.dates_parsed += 1,
            DateAdded::Unparsed(_) => self.dates_unparsed += 1,
            DateAdded::Missing => self.dates_missing += 1,
        }

        if record.duration_minutes.is_some() || record.season_count.is_some() {
            self.durations_parsed += 1;
        } else {
            self.durations_unparsed += 1;
        }
    }

    /// Add a warning to the summary.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Total number of default substitutions across fields.
    pub fn total_defaults(&self) -> usize {
        self.defaults_substituted.values().sum()
    }

    /// Calculate the percentage of records rejected.
    pub fn rejection_percentage(&self) -> f32 {
        if self.records_in == 0 {
            0.0
        } else {
            (self.records_rejected as f32 / self.records_in as f32) * 100.0
        }
    }
}
