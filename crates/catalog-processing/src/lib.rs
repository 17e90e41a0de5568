//! Catalog Normalization Library
//!
//! Cleans tabular movie/TV catalog records into a consistent, typed form.
//!
//! # Overview
//!
//! Every record flows through the same stages:
//!
//! - **Missing values**: absent `director`, `cast`, `country`, `duration` and
//!   `rating` receive configurable defaults
//! - **Whitespace**: trimming and collapsing of interior runs
//! - **Canonicalization**: list splitting and exact-match alias rewriting
//!   (`"USA"` becomes `"United States"`)
//! - **Title case**: `title`, `country`, `cast`, `director` and `genres`
//! - **Typed fields**: `date_added` parsed against ordered formats, minutes or
//!   season counts extracted from `duration`
//!
//! The stages are pure and idempotent. Records are cleaned in chunks on a
//! rayon pool; a malformed record (no `id`) is rejected on its own and never
//! fails the batch.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use catalog_processing::frame::{load_catalog_csv, records_from_frame};
//! use catalog_processing::{CleaningConfig, Pipeline};
//!
//! let df = load_catalog_csv("data/netflix_titles.csv")?;
//! let records = records_from_frame(&df)?;
//!
//! let outcome = Pipeline::builder()
//!     .config(CleaningConfig::from_json_file("catalog.json")?)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(&records)?;
//!
//! println!("{} cleaned, {} rejected", outcome.records.len(), outcome.rejections.len());
//! ```
//!
//! # Configuration
//!
//! Alias tables and date formats are data. Use [`CleaningConfig`] directly,
//! through its builder, or from a JSON document:
//!
//! ```json
//! {
//!   "aliases": { "country": { "USA": "United States", "U.K.": "United Kingdom" } },
//!   "date_formats": ["%B %d, %Y", "%Y-%m-%d"],
//!   "chunk_size": 2048
//! }
//! ```
//!
//! # Insights
//!
//! [`reporting::insights`] answers catalog questions over cleaned records
//! (top countries, titles added per year, longest movie, ...).

pub mod cleaner;
pub mod config;
pub mod error;
pub mod frame;
pub mod pipeline;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::RecordCleaner;
pub use config::{AliasTable, CleaningConfig, CleaningConfigBuilder, ConfigValidationError};
pub use error::{CleaningError, Result as CleaningResult, ResultExt};
pub use pipeline::{
    BatchExecutor, CancellationToken, CleaningStage, ClosureProgressReporter, Pipeline,
    PipelineBuilder, ProgressReporter, ProgressUpdate,
};
pub use reporting::{CatalogInsights, CatalogReport, ContentCategory, ReportGenerator};
pub use types::{
    BatchOutcome, CleanRecord, CleaningSummary, DateAdded, RawRecord, RecordRejection,
    RecordTrace, TextField,
};
