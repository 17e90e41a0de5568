//! Report generation module.
//!
//! Writes the cleaned catalog and a JSON run report, and computes the
//! catalog-wide insights that can be attached to it.
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog_processing::reporting::{CatalogInsights, ReportGenerator};
//!
//! let generator = ReportGenerator::new(PathBuf::from("outputs"), None);
//! let csv_path = generator.write_clean_csv(&outcome.records, "netflix_titles")?;
//!
//! let insights = CatalogInsights::from_records(&outcome.records, 10);
//! let report = ReportGenerator::build_report(
//!     "data/netflix_titles.csv",
//!     csv_path.to_str(),
//!     &outcome,
//!     Some(insights),
//! );
//! generator.write_report_to_file(&report, "netflix_titles")?;
//! ```

mod generator;
pub mod insights;

pub use generator::{CatalogReport, ReportGenerator};
pub use insights::{CatalogInsights, ContentCategory, LongestMovie, RankedValue};
