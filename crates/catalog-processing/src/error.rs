//! Custom error types for the catalog normalization pipeline.
//!
//! Missing values and unparseable dates/durations are *not* errors: they are
//! handled inside the cleaning stages with defaults and explicit markers.
//! The only per-record failure is a malformed record (e.g. a missing `id`),
//! which rejects that record and never the batch.
//!
//! Errors are serializable so that rejections and failures can be written
//! into JSON reports.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the normalization pipeline.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// Pipeline was cancelled by the caller.
    #[error("Pipeline cancelled")]
    Cancelled,

    /// A required field is absent or blank; the record is rejected.
    #[error("Record #{index} is missing required field '{field}'")]
    MissingRequiredField { index: usize, field: &'static str },

    /// A required column is absent from an input frame.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Report generation failed.
    #[error("Failed to generate report: {0}")]
    ReportGenerationFailed(String),

    /// Internal error (e.g., worker pool construction failure).
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for machine consumers (reports, JSON output).
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled => "CANCELLED",
            Self::MissingRequiredField { .. } => "MISSING_REQUIRED_FIELD",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ReportGenerationFailed(_) => "REPORT_GENERATION_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error represents a cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::WithContext { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }

    /// Check if this error only affects a single record.
    ///
    /// Record-level errors are collected as rejections; everything else
    /// aborts the run.
    pub fn is_record_level(&self) -> bool {
        match self {
            Self::MissingRequiredField { .. } => true,
            Self::WithContext { source, .. } => source.is_record_level(),
            _ => false,
        }
    }
}

impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(CleaningError::Cancelled.error_code(), "CANCELLED");
        assert_eq!(
            CleaningError::MissingRequiredField { index: 2, field: "id" }.error_code(),
            "MISSING_REQUIRED_FIELD"
        );
    }

    #[test]
    fn test_missing_field_message_names_record_and_field() {
        let error = CleaningError::MissingRequiredField { index: 2, field: "id" };
        assert_eq!(error.to_string(), "Record #2 is missing required field 'id'");
    }

    #[test]
    fn test_is_cancelled() {
        assert!(CleaningError::Cancelled.is_cancelled());
        assert!(CleaningError::Cancelled.with_context("chunk 3").is_cancelled());
        assert!(!CleaningError::Internal("x".to_string()).is_cancelled());
    }

    #[test]
    fn test_is_record_level() {
        assert!(CleaningError::MissingRequiredField { index: 0, field: "id" }.is_record_level());
        assert!(!CleaningError::Cancelled.is_record_level());
        assert!(!CleaningError::InvalidConfig("bad".to_string()).is_record_level());
    }

    #[test]
    fn test_error_serialization() {
        let error = CleaningError::ColumnNotFound("show_id".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("show_id"));
    }

    #[test]
    fn test_with_context() {
        let error = CleaningError::ColumnNotFound("show_id".to_string())
            .with_context("Reading catalog frame");
        assert!(error.to_string().contains("Reading catalog frame"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
    }
}
