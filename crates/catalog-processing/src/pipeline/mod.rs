//! Pipeline module.
//!
//! Batch orchestration: chunking, parallel execution, progress and cancellation.

mod builder;
mod executor;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder};
pub use executor::{BatchExecutor, IndexedOutcome};
pub use progress::{
    CancellationToken, ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate,
};
