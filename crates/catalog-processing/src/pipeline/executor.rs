//! Chunk executor: cleans a slice of records sequentially or on a rayon pool.

use crate::cleaner::RecordCleaner;
use crate::config::CleaningConfig;
use crate::error::{CleaningError, Result};
use crate::types::{CleanRecord, RawRecord, RecordTrace};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;
use tracing::debug;

/// Per-record result of a chunk, tagged with the record's batch index.
pub type IndexedOutcome = (usize, Result<(CleanRecord, RecordTrace)>);

/// Executes the cleaning stages over chunks of records.
///
/// Output order always matches input order, whichever threads did the work.
pub struct BatchExecutor {
    cleaner: RecordCleaner,
    parallel: bool,
    pool: Option<Arc<ThreadPool>>,
}

static_assertions::assert_impl_all!(BatchExecutor: Send, Sync);

impl BatchExecutor {
    /// Create an executor, building a dedicated pool when the configuration
    /// asks for a fixed number of worker threads.
    pub fn new(config: Arc<CleaningConfig>) -> Result<Self> {
        let pool = match (config.parallel, config.worker_threads) {
            (true, Some(threads)) => {
                debug!("Building cleaning pool with {} threads", threads);
                let pool = ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|idx| format!("catalog-clean-{idx}"))
                    .build()
                    .map_err(|e| CleaningError::Internal(format!("Failed to build worker pool: {e}")))?;
                Some(Arc::new(pool))
            }
            _ => None,
        };

        Ok(Self {
            parallel: config.parallel,
            cleaner: RecordCleaner::new(config),
            pool,
        })
    }

    pub fn cleaner(&self) -> &RecordCleaner {
        &self.cleaner
    }

    /// Clean one chunk. `offset` is the batch index of `chunk[0]`.
    pub fn clean_chunk(&self, offset: usize, chunk: &[RawRecord]) -> Vec<IndexedOutcome> {
        let clean = |(i, raw): (usize, &RawRecord)| {
            let index = offset + i;
            (index, self.cleaner.clean_traced(index, raw))
        };

        if !self.parallel {
            return chunk.iter().enumerate().map(clean).collect();
        }

        match &self.pool {
            Some(pool) => pool.install(|| chunk.par_iter().enumerate().map(clean).collect()),
            None => chunk.par_iter().enumerate().map(clean).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TextField;

    fn batch(n: usize) -> Vec<RawRecord> {
        (0..n)
            .map(|i| RawRecord::new(format!("s{i}")).with(TextField::Title, format!("title  {i}")))
            .collect()
    }

    fn ids(outcomes: &[IndexedOutcome]) -> Vec<String> {
        outcomes
            .iter()
            .map(|(_, r)| r.as_ref().unwrap().0.id.clone())
            .collect()
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let records = batch(257);

        let sequential = BatchExecutor::new(Arc::new(
            CleaningConfig::builder().parallel(false).build().unwrap(),
        ))
        .unwrap();
        let pooled = BatchExecutor::new(Arc::new(
            CleaningConfig::builder().worker_threads(4).build().unwrap(),
        ))
        .unwrap();
        let global = BatchExecutor::new(Arc::new(CleaningConfig::default())).unwrap();

        let a = sequential.clean_chunk(0, &records);
        let b = pooled.clean_chunk(0, &records);
        let c = global.clean_chunk(0, &records);

        assert_eq!(ids(&a), ids(&b));
        assert_eq!(ids(&a), ids(&c));
        assert_eq!(ids(&a)[100], "s100");
    }

    #[test]
    fn test_offset_is_applied_to_indices() {
        let executor = BatchExecutor::new(Arc::new(CleaningConfig::default())).unwrap();
        let records = batch(3);
        let outcomes = executor.clean_chunk(10, &records);
        let indices: Vec<usize> = outcomes.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![10, 11, 12]);
    }

    #[test]
    fn test_rejection_carries_batch_index() {
        let executor = BatchExecutor::new(Arc::new(CleaningConfig::default())).unwrap();
        let records = vec![RawRecord::new("s1"), RawRecord::default()];
        let outcomes = executor.clean_chunk(5, &records);
        assert!(outcomes[0].1.is_ok());
        assert!(matches!(
            outcomes[1].1,
            Err(CleaningError::MissingRequiredField { index: 6, field: "id" })
        ));
    }
}
