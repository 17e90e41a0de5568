//! Main normalization pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for running
//! the cleaning stages over a batch of records.

use crate::config::CleaningConfig;
use crate::error::{CleaningError, Result};
use crate::pipeline::BatchExecutor;
use crate::pipeline::progress::{
    CancellationToken, ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate,
};
use crate::types::{BatchOutcome, CleanRecord, CleaningSummary, RawRecord, RecordRejection};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// The main normalization pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use catalog_processing::{CancellationToken, CleaningConfig, Pipeline};
///
/// let token = CancellationToken::new();
///
/// let outcome = Pipeline::builder()
///     .cancellation_token(token.clone())
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .config(CleaningConfig::builder().chunk_size(256).build()?)
///     .build()?
///     .process(&records)?;
///
/// for rejection in &outcome.rejections {
///     eprintln!("record #{} rejected: {}", rejection.index, rejection.message);
/// }
/// ```
pub struct Pipeline {
    config: Arc<CleaningConfig>,
    executor: BatchExecutor,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cancellation_token: CancellationToken,
}

static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Clean a batch of records.
    ///
    /// Malformed records are collected in [`BatchOutcome::rejections`] and do
    /// not fail the batch.
    ///
    /// # Errors
    ///
    /// Returns `Err(CleaningError::Cancelled)` if the pipeline was cancelled
    /// via the cancellation token.
    pub fn process(&self, records: &[RawRecord]) -> Result<BatchOutcome> {
        match self.process_internal(records) {
            Ok(outcome) => {
                self.report_progress(ProgressUpdate::complete(format!(
                    "Cleaned {} of {} records",
                    outcome.summary.records_cleaned, outcome.summary.records_in
                )));
                Ok(outcome)
            }
            Err(e) => {
                if e.is_cancelled() {
                    self.report_progress(ProgressUpdate::cancelled());
                } else {
                    self.report_progress(ProgressUpdate::failed(e.to_string()));
                }
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Clean a single record outside of a batch.
    pub fn clean_one(&self, record: &RawRecord) -> Result<CleanRecord> {
        self.executor.cleaner().clean(0, record)
    }

    /// Check if cancellation has been requested.
    fn check_cancelled(&self) -> Result<()> {
        if self.cancellation_token.is_cancelled() {
            return Err(CleaningError::Cancelled);
        }
        Ok(())
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal(&self, records: &[RawRecord]) -> Result<BatchOutcome> {
        let start_time = Instant::now();
        let total = records.len();

        info!("Starting normalization of {} records...", total);
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Initializing,
            0.0,
            "Starting normalization pipeline...",
        ));

        let mut summary = CleaningSummary::new();
        summary.records_in = total;

        let mut cleaned = Vec::with_capacity(total);
        let mut rejections = Vec::new();

        let chunk_size = self.config.chunk_size.max(1);
        let chunk_count = total.div_ceil(chunk_size);
        let mut processed = 0;

        for (chunk_idx, chunk) in records.chunks(chunk_size).enumerate() {
            self.check_cancelled()?;

            let offset = chunk_idx * chunk_size;
            debug!("Cleaning chunk {}/{} ({} records)", chunk_idx + 1, chunk_count, chunk.len());

            for (index, result) in self.executor.clean_chunk(offset, chunk) {
                match result {
                    Ok((record, trace)) => {
                        summary.record(&record, &trace);
                        cleaned.push(record);
                    }
                    Err(e) if e.is_record_level() => {
                        warn!("Rejected record: {}", e);
                        let id = records[index]
                            .id
                            .as_deref()
                            .map(str::trim)
                            .filter(|id| !id.is_empty())
                            .map(str::to_string);
                        rejections.push(RecordRejection::from_error(index, id, &e));
                    }
                    Err(e) => return Err(e.with_context(format!("Record #{index}"))),
                }
            }

            processed += chunk.len();
            self.report_progress(ProgressUpdate::with_items(
                CleaningStage::Cleaning,
                format!("Chunk {}/{}", chunk_idx + 1, chunk_count),
                processed,
                total,
                format!("Cleaned {processed} of {total} records"),
            ));
        }

        self.check_cancelled()?;
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Summarizing,
            0.0,
            "Summarizing run...",
        ));

        summary.records_rejected = rejections.len();
        let threshold = self.config.rejection_warning_threshold * 100.0;
        if f64::from(summary.rejection_percentage()) > threshold {
            summary.add_warning(format!(
                "{:.1}% of records were rejected (threshold {:.1}%)",
                summary.rejection_percentage(),
                threshold
            ));
        }
        if summary.dates_unparsed > 0 {
            summary.add_warning(format!(
                "{} date_added values matched none of the accepted formats",
                summary.dates_unparsed
            ));
        }
        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Normalization complete: {} cleaned, {} rejected in {}ms",
            summary.records_cleaned, summary.records_rejected, summary.duration_ms
        );

        Ok(BatchOutcome {
            records: cleaned,
            rejections,
            summary,
        })
    }
}

/// Builder for creating a [`Pipeline`] with custom configuration.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<CleaningConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cancellation_token: Option<CancellationToken>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pipeline configuration.
    pub fn config(mut self, config: CleaningConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during a run.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// For shared or stateful reporters, use
    /// [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Set a cancellation token for stopping the pipeline between chunks.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Build the pipeline.
    ///
    /// Returns [`CleaningError::InvalidConfig`] if the configuration is
    /// invalid, or [`CleaningError::Internal`] if the worker pool cannot be
    /// created.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config
            .validate()
            .map_err(|e| CleaningError::InvalidConfig(e.to_string()))?;

        for (field, key) in config.title_cased_alias_keys() {
            warn!(
                "Alias '{}' on '{}' is already title-cased; differently cased input is only rewritten when cleaned twice",
                key, field
            );
        }

        let config = Arc::new(config);
        let executor = BatchExecutor::new(Arc::clone(&config))?;

        Ok(Pipeline {
            config,
            executor,
            progress_reporter: self.progress_reporter,
            cancellation_token: self.cancellation_token.unwrap_or_default(),
        })
    }
}
