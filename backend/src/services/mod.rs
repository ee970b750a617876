//! Service layer: analysis orchestration on top of the repository.
//!
//! - [`aggregator`]: classification across hours and topics of one window
//! - [`run_cache`]: memoized runs keyed by (user, trigger date)
//! - [`batch`] / [`batch_job`]: chunked background analysis with progress
//! - [`job_tracker`]: job status and logs for polling and SSE
//! - [`sequence_check`]: calendar-gap checks and window explanations

pub mod aggregator;
pub mod batch;
pub mod batch_job;
pub mod error;
pub mod job_tracker;
pub mod run_cache;
pub mod sequence_check;

pub use aggregator::AnalysisAggregator;
pub use batch::{
    BatchProgress, BatchRequest, BatchSnapshot, BatchSummary, BatchWorker, WorkerMessage,
};
pub use batch_job::run_batch_job;
pub use error::{AnalysisError, BatchError};
pub use job_tracker::{Job, JobStatus, JobTracker, LogEntry, LogLevel};
pub use run_cache::{AnalysisRunCache, WindowMode};
pub use sequence_check::{
    check_new_date, explain_window, recommended_sequence, NewDateCheck, RecommendedSequence,
    WindowExplanation,
};
