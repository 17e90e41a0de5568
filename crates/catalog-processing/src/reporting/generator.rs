use crate::error::{CleaningError, Result};
use crate::frame::write_catalog_csv;
use crate::reporting::CatalogInsights;
use crate::types::{BatchOutcome, CleanRecord, CleaningSummary, RecordRejection};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

// ============================================================================
// Report Types
// ============================================================================

/// Run report for CLI and library output.
///
/// Use this for both JSON output (`--json`) and file writing (`--emit-report`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input file
    pub input_file: String,
    /// Path to the cleaned CSV (if written)
    pub output_file: Option<String>,
    /// Counters describing the run
    pub summary: CleaningSummary,
    /// Records the pipeline refused to clean
    pub rejections: Vec<RecordRejection>,
    /// Catalog aggregates, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<CatalogInsights>,
}

pub struct ReportGenerator {
    output_dir: PathBuf,
    output_name: Option<String>,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs"),
            output_name: None,
        }
    }
}

impl ReportGenerator {
    /// Create a new ReportGenerator with custom output settings.
    pub fn new(output_dir: PathBuf, output_name: Option<String>) -> Self {
        Self { output_dir, output_name }
    }

    /// Base name for output files: the custom name if set, else `input_stem`.
    pub fn output_stem(&self, input_stem: &str) -> String {
        self.output_name
            .clone()
            .unwrap_or_else(|| input_stem.to_string())
    }

    /// Write cleaned records to `<stem>_cleaned.csv` in the output directory.
    pub fn write_clean_csv(&self, records: &[CleanRecord], input_stem: &str) -> Result<PathBuf> {
        let path = self
            .output_dir
            .join(format!("{}_cleaned.csv", self.output_stem(input_stem)));
        write_catalog_csv(records, &path)?;
        Ok(path)
    }

    /// Build a report from a pipeline outcome.
    pub fn build_report(
        input_file: &str,
        output_file: Option<&str>,
        outcome: &BatchOutcome,
        insights: Option<CatalogInsights>,
    ) -> CatalogReport {
        CatalogReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.to_string(),
            output_file: output_file.map(String::from),
            summary: outcome.summary.clone(),
            rejections: outcome.rejections.clone(),
            insights,
        }
    }

    /// Write a report to `<stem>_report.json` in the output directory.
    ///
    /// For example, if `input_stem` is "netflix_titles" and no output name is
    /// set, the file will be "netflix_titles_report.json".
    pub fn write_report_to_file(&self, report: &CatalogReport, input_stem: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", self.output_stem(input_stem)));
        let mut file = File::create(&report_path)?;
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| CleaningError::ReportGenerationFailed(e.to_string()))?;
        file.write_all(json.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawRecord;
    use crate::{Pipeline, TextField};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("catalog-report-{name}-{nanos}"))
    }

    fn outcome() -> BatchOutcome {
        Pipeline::builder()
            .build()
            .unwrap()
            .process(&[
                RawRecord::new("s1").with(TextField::Kind, "Movie"),
                RawRecord::default(),
            ])
            .unwrap()
    }

    #[test]
    fn test_output_stem() {
        let default = ReportGenerator::new(PathBuf::from("out"), None);
        assert_eq!(default.output_stem("netflix_titles"), "netflix_titles");

        let named = ReportGenerator::new(PathBuf::from("out"), Some("catalog".to_string()));
        assert_eq!(named.output_stem("netflix_titles"), "catalog");
    }

    #[test]
    fn test_build_report_carries_rejections() {
        let outcome = outcome();
        let report = ReportGenerator::build_report("in.csv", None, &outcome, None);

        assert_eq!(report.summary.records_in, 2);
        assert_eq!(report.rejections.len(), 1);
        assert_eq!(report.rejections[0].index, 1);

        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("insights"));
        assert!(json.contains("MISSING_REQUIRED_FIELD"));
    }

    #[test]
    fn test_write_report_and_csv() {
        let dir = scratch_dir("write");
        let generator = ReportGenerator::new(dir.clone(), None);
        let outcome = outcome();

        let csv_path = generator.write_clean_csv(&outcome.records, "sample").unwrap();
        assert!(csv_path.ends_with("sample_cleaned.csv"));
        assert!(csv_path.exists());

        let insights = CatalogInsights::from_records(&outcome.records, 3);
        let report = ReportGenerator::build_report(
            "sample.csv",
            csv_path.to_str(),
            &outcome,
            Some(insights),
        );
        let report_path = generator.write_report_to_file(&report, "sample").unwrap();
        assert!(report_path.ends_with("sample_report.json"));

        let written: CatalogReport =
            serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(written.summary.records_cleaned, 1);
        assert_eq!(written.insights.unwrap().total_titles, 1);

        fs::remove_dir_all(dir).ok();
    }
}
