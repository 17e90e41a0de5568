//! Configuration types for the catalog normalization pipeline.
//!
//! The alias tables and the accepted date formats are data, not code: they can
//! be loaded from a JSON file so that new aliases or formats do not require a
//! rebuild. A configuration is validated once and then shared read-only by
//! every worker for the duration of a run.

use crate::cleaner::title_case;
use crate::error::{CleaningError, Result};
use crate::types::TextField;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default sentinel for absent free-text fields.
pub const UNKNOWN: &str = "Unknown";

/// Default sentinel for an absent rating.
pub const NOT_RATED: &str = "Not Rated";

/// Exact-match alias table: source spelling to canonical spelling.
pub type AliasTable = BTreeMap<String, String>;

fn default_missing_values() -> BTreeMap<TextField, String> {
    BTreeMap::from([
        (TextField::Director, UNKNOWN.to_string()),
        (TextField::Cast, UNKNOWN.to_string()),
        (TextField::Country, UNKNOWN.to_string()),
        (TextField::Duration, UNKNOWN.to_string()),
        (TextField::Rating, NOT_RATED.to_string()),
    ])
}

fn default_aliases() -> BTreeMap<TextField, AliasTable> {
    let country = AliasTable::from([
        ("USA".to_string(), "United States".to_string()),
        ("United States of America".to_string(), "United States".to_string()),
        ("UK".to_string(), "United Kingdom".to_string()),
    ]);
    BTreeMap::from([(TextField::Country, country)])
}

fn default_date_formats() -> Vec<String> {
    ["%B %d, %Y", "%Y-%m-%d", "%d-%b-%y"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Configuration for the normalization pipeline.
///
/// Use [`CleaningConfig::builder()`] for a fluent, validated setup or
/// [`CleaningConfig::from_json_file`] to load one from disk. Fields omitted
/// from a JSON document keep their defaults.
///
/// # Example
///
/// ```rust,ignore
/// use catalog_processing::config::CleaningConfig;
/// use catalog_processing::TextField;
///
/// let config = CleaningConfig::builder()
///     .alias(TextField::Country, "U.S.", "United States")
///     .date_formats(["%Y-%m-%d", "%B %d, %Y"])
///     .chunk_size(512)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Replacement values for absent fields.
    /// Default: director/cast/country/duration -> "Unknown", rating -> "Not Rated"
    pub missing_values: BTreeMap<TextField, String>,

    /// Exact-match alias tables per field. List fields are matched per
    /// comma-separated token, other fields on their whole value.
    ///
    /// Aliases are looked up before title casing. On a title-cased field a key
    /// already in title case (`"Usa"`) misses lower-case input on the first
    /// pass and only matches when the output is cleaned again; see
    /// [`CleaningConfig::title_cased_alias_keys`].
    /// Default: country aliases for USA, United States of America and UK
    pub aliases: BTreeMap<TextField, AliasTable>,

    /// Accepted `date_added` formats (chrono strftime syntax), tried in order.
    /// Default: ["%B %d, %Y", "%Y-%m-%d", "%d-%b-%y"]
    pub date_formats: Vec<String>,

    /// Number of records submitted per chunk. Cancellation and progress are
    /// checked between chunks.
    /// Default: 1024
    pub chunk_size: usize,

    /// Whether records within a chunk are cleaned in parallel.
    /// Default: true
    pub parallel: bool,

    /// Worker threads for parallel cleaning. `None` uses the global pool.
    /// Default: None
    pub worker_threads: Option<usize>,

    /// Fraction of rejected records (0.0 - 1.0) above which the run summary
    /// carries a warning.
    /// Default: 0.05 (5%)
    pub rejection_warning_threshold: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            missing_values: default_missing_values(),
            aliases: default_aliases(),
            date_formats: default_date_formats(),
            chunk_size: 1024,
            parallel: true,
            worker_threads: None,
            rejection_warning_threshold: 0.05,
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Parse and validate a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CleaningConfig = serde_json::from_str(json)?;
        config
            .validate()
            .map_err(|e| CleaningError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| CleaningError::Io(e).with_context(format!("Reading {}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Alias table for a field, if one is configured.
    pub fn aliases_for(&self, field: TextField) -> Option<&AliasTable> {
        self.aliases.get(&field).filter(|table| !table.is_empty())
    }

    /// Alias keys that title casing itself can produce on a title-cased field.
    ///
    /// Such a key is missed when the raw value differs only in case, so
    /// re-cleaning the output rewrites it. Keys in upper case (`"USA"`) or
    /// with lower-case words (`"United States of America"`) are not affected.
    pub fn title_cased_alias_keys(&self) -> Vec<(TextField, String)> {
        self.aliases
            .iter()
            .filter(|(field, _)| TextField::TITLE_CASED.contains(field))
            .flat_map(|(field, table)| {
                table
                    .iter()
                    .filter(|(from, to)| from != to && title_case(from) == **from)
                    .map(move |(from, _)| (*field, from.clone()))
            })
            .collect()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if self.date_formats.is_empty() {
            return Err(ConfigValidationError::NoDateFormats);
        }

        for format in &self.date_formats {
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(ConfigValidationError::InvalidDateFormat(format.clone()));
            }
        }

        if self.missing_values.contains_key(&TextField::Id) {
            return Err(ConfigValidationError::DefaultForRequiredField(TextField::Id));
        }

        for (field, value) in &self.missing_values {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::BlankDefault(*field));
            }
        }

        for (field, table) in &self.aliases {
            if matches!(field, TextField::Id | TextField::DateAdded) {
                return Err(ConfigValidationError::AliasNotSupported(*field));
            }
            for (from, to) in table {
                if from.trim().is_empty() || to.trim().is_empty() {
                    return Err(ConfigValidationError::BlankAlias(*field));
                }
                if field.is_list() && from.contains(',') {
                    return Err(ConfigValidationError::DelimiterInAlias {
                        field: *field,
                        alias: from.clone(),
                    });
                }
            }
        }

        if self.chunk_size == 0 {
            return Err(ConfigValidationError::InvalidChunkSize(self.chunk_size));
        }

        if self.worker_threads == Some(0) {
            return Err(ConfigValidationError::InvalidWorkerThreads(0));
        }

        if !(0.0..=1.0).contains(&self.rejection_warning_threshold) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "rejection_warning_threshold".to_string(),
                value: self.rejection_warning_threshold,
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("At least one date format is required")]
    NoDateFormats,

    #[error("Invalid date format '{0}'")]
    InvalidDateFormat(String),

    #[error("Field '{0}' is required and cannot have a default")]
    DefaultForRequiredField(TextField),

    #[error("Default value for '{0}' must not be blank")]
    BlankDefault(TextField),

    #[error("Aliases are not supported for field '{0}'")]
    AliasNotSupported(TextField),

    #[error("Alias table for '{0}' contains a blank entry")]
    BlankAlias(TextField),

    #[error("Alias '{alias}' for list field '{field}' contains the list delimiter")]
    DelimiterInAlias { field: TextField, alias: String },

    #[error("Invalid chunk size: {0} (must be at least 1)")]
    InvalidChunkSize(usize),

    #[error("Invalid worker thread count: {0} (must be at least 1)")]
    InvalidWorkerThreads(usize),

    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    missing_values: Option<BTreeMap<TextField, String>>,
    aliases: Option<BTreeMap<TextField, AliasTable>>,
    date_formats: Option<Vec<String>>,
    chunk_size: Option<usize>,
    parallel: Option<bool>,
    worker_threads: Option<usize>,
    rejection_warning_threshold: Option<f64>,
}

impl CleaningConfigBuilder {
    /// Set (or override) the default for an absent field.
    pub fn missing_value(mut self, field: TextField, value: impl Into<String>) -> Self {
        self.missing_values
            .get_or_insert_with(default_missing_values)
            .insert(field, value.into());
        self
    }

    /// Add one alias, keeping the default tables.
    pub fn alias(mut self, field: TextField, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.aliases
            .get_or_insert_with(default_aliases)
            .entry(field)
            .or_default()
            .insert(from.into(), to.into());
        self
    }

    /// Replace the alias table of a field entirely.
    pub fn alias_table(mut self, field: TextField, table: AliasTable) -> Self {
        self.aliases
            .get_or_insert_with(default_aliases)
            .insert(field, table);
        self
    }

    /// Set the ordered list of accepted date formats.
    pub fn date_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_formats = Some(formats.into_iter().map(Into::into).collect());
        self
    }

    /// Set the number of records per chunk.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size);
        self
    }

    /// Enable or disable parallel cleaning within a chunk.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    /// Use a dedicated pool with this many worker threads.
    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// Set the rejection rate (0.0 - 1.0) that triggers a summary warning.
    pub fn rejection_warning_threshold(mut self, threshold: f64) -> Self {
        self.rejection_warning_threshold = Some(threshold);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<CleaningConfig, ConfigValidationError> {
        let config = CleaningConfig {
            missing_values: self.missing_values.unwrap_or_else(default_missing_values),
            aliases: self.aliases.unwrap_or_else(default_aliases),
            date_formats: self.date_formats.unwrap_or_else(default_date_formats),
            chunk_size: self.chunk_size.unwrap_or(1024),
            parallel: self.parallel.unwrap_or(true),
            worker_threads: self.worker_threads,
            rejection_warning_threshold: self.rejection_warning_threshold.unwrap_or(0.05),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CleaningConfig::default();
        assert_eq!(config.missing_values.get(&TextField::Rating).unwrap(), NOT_RATED);
        assert_eq!(config.missing_values.get(&TextField::Cast).unwrap(), UNKNOWN);
        assert_eq!(
            config.aliases_for(TextField::Country).unwrap().get("USA").unwrap(),
            "United States"
        );
        assert_eq!(config.chunk_size, 1024);
        assert!(config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_defaults() {
        let config = CleaningConfig::builder().build().unwrap();
        assert_eq!(config, CleaningConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = CleaningConfig::builder()
            .alias(TextField::Country, "U.S.", "United States")
            .missing_value(TextField::Genres, "Uncategorized")
            .date_formats(["%Y-%m-%d"])
            .chunk_size(16)
            .parallel(false)
            .worker_threads(2)
            .build()
            .unwrap();

        let countries = config.aliases_for(TextField::Country).unwrap();
        assert_eq!(countries.get("U.S.").unwrap(), "United States");
        assert_eq!(countries.get("UK").unwrap(), "United Kingdom");
        assert_eq!(config.missing_values.get(&TextField::Genres).unwrap(), "Uncategorized");
        assert_eq!(config.date_formats, vec!["%Y-%m-%d".to_string()]);
        assert_eq!(config.chunk_size, 16);
        assert!(!config.parallel);
        assert_eq!(config.worker_threads, Some(2));
    }

    #[test]
    fn test_validation_rejects_empty_date_formats() {
        let result = CleaningConfig::builder().date_formats(Vec::<String>::new()).build();
        assert!(matches!(result.unwrap_err(), ConfigValidationError::NoDateFormats));
    }

    #[test]
    fn test_validation_rejects_invalid_date_format() {
        let result = CleaningConfig::builder().date_formats(["%Y-%Q"]).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidDateFormat(_)
        ));
    }

    #[test]
    fn test_validation_rejects_default_for_id() {
        let result = CleaningConfig::builder().missing_value(TextField::Id, "none").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::DefaultForRequiredField(TextField::Id)
        ));
    }

    #[test]
    fn test_validation_rejects_delimiter_in_list_alias() {
        let result = CleaningConfig::builder()
            .alias(TextField::Country, "USA, Canada", "North America")
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::DelimiterInAlias { .. }
        ));
    }

    #[test]
    fn test_validation_rejects_zero_chunk_size_and_threads() {
        assert!(matches!(
            CleaningConfig::builder().chunk_size(0).build().unwrap_err(),
            ConfigValidationError::InvalidChunkSize(0)
        ));
        assert!(matches!(
            CleaningConfig::builder().worker_threads(0).build().unwrap_err(),
            ConfigValidationError::InvalidWorkerThreads(0)
        ));
    }

    #[test]
    fn test_validation_rejects_threshold_out_of_range() {
        let result = CleaningConfig::builder().rejection_warning_threshold(1.5).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidThreshold { .. }
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = CleaningConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: CleaningConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{
            "aliases": { "country": { "Deutschland": "Germany" } },
            "date_formats": ["%d/%m/%Y"],
            "parallel": false
        }"#;

        let config = CleaningConfig::from_json_str(json).expect("Should deserialize partial JSON");

        let countries = config.aliases_for(TextField::Country).unwrap();
        assert_eq!(countries.len(), 1);
        assert_eq!(countries.get("Deutschland").unwrap(), "Germany");
        assert_eq!(config.date_formats, vec!["%d/%m/%Y".to_string()]);
        assert!(!config.parallel);
        // omitted fields keep their defaults
        assert_eq!(config.chunk_size, 1024);
        assert_eq!(config.missing_values.get(&TextField::Rating).unwrap(), NOT_RATED);
    }

    #[test]
    fn test_config_from_json_rejects_invalid() {
        let err = CleaningConfig::from_json_str(r#"{ "chunk_size": 0 }"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_title_cased_alias_keys() {
        assert!(CleaningConfig::default().title_cased_alias_keys().is_empty());

        let config = CleaningConfig::builder()
            .alias(TextField::Country, "Usa", "United States")
            .alias(TextField::Country, "Deutschland", "Germany")
            .alias(TextField::Genres, "TV Dramas", "Dramas")
            .alias(TextField::Rating, "Ur", "Not Rated")
            .build()
            .unwrap();

        assert_eq!(
            config.title_cased_alias_keys(),
            vec![
                (TextField::Country, "Deutschland".to_string()),
                (TextField::Country, "Usa".to_string()),
            ]
        );
    }
}
