//! Background batch analysis job.
//!
//! Drives a [`BatchWorker`], mirrors its messages into the [`JobTracker`] and
//! stores every successful run through the run cache.

use super::batch::{BatchRequest, BatchSnapshot, BatchSummary, BatchWorker, WorkerMessage};
use super::error::BatchError;
use super::job_tracker::{JobTracker, LogLevel};
use super::run_cache::AnalysisRunCache;

/// Run a batch for `request` and record its progress under `job_id`.
///
/// Designed to be spawned as a background task. Empty `request.hours` are
/// resolved from the user's hour count before the worker starts.
pub async fn run_batch_job(
    job_id: String,
    tracker: JobTracker,
    cache: AnalysisRunCache,
    worker: BatchWorker,
    mut request: BatchRequest,
) -> Result<BatchSummary, BatchError> {
    tracker.log(&job_id, LogLevel::Info, "Starting batch analysis...");

    let prepared = async {
        request.hours = cache
            .resolve_hours(&request.user, &request.hours)
            .await
            .map_err(|e| BatchError::Worker(e.to_string()))?;
        BatchSnapshot::load(cache.repository().as_ref(), &request.user)
            .await
            .map_err(BatchError::from)
    }
    .await;
    let snapshot = match prepared {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracker.fail_job(&job_id, format!("Failed to load inputs: {}", e));
            return Err(e);
        }
    };
    tracker.log(
        &job_id,
        LogLevel::Info,
        format!(
            "Loaded {} complete dates, {} hours per run",
            snapshot.resolver().len(),
            request.hours.len()
        ),
    );

    let (mut rx, handle) = worker.spawn(request, snapshot);
    while let Some(message) = rx.recv().await {
        match message {
            WorkerMessage::Started { total, chunk_size } => tracker.log(
                &job_id,
                LogLevel::Info,
                format!("Analyzing {} dates in chunks of {}", total, chunk_size),
            ),
            WorkerMessage::Progress(progress) => {
                tracker.set_progress(&job_id, progress);
                tracker.log(
                    &job_id,
                    LogLevel::Info,
                    format!(
                        "Processed {}/{} ({}%)",
                        progress.processed, progress.total, progress.percent
                    ),
                );
            }
            WorkerMessage::ItemFailed { trigger, error } => tracker.log(
                &job_id,
                LogLevel::Warning,
                format!("Skipped {}: {}", trigger, error),
            ),
            WorkerMessage::Result { run } => {
                let trigger = run.trigger_date;
                match cache.store(*run).await {
                    Ok(()) => tracker.log(
                        &job_id,
                        LogLevel::Success,
                        format!("✓ Stored analysis for {}", trigger),
                    ),
                    Err(e) => tracker.log(
                        &job_id,
                        LogLevel::Error,
                        format!("Failed to store analysis for {}: {}", trigger, e),
                    ),
                }
            }
            WorkerMessage::Error { chunk, message } => tracker.log(
                &job_id,
                LogLevel::Error,
                format!("Chunk {} failed: {}", chunk, message),
            ),
        }
    }

    let summary = match handle.await {
        Ok(summary) => summary,
        Err(e) => {
            let msg = format!("Batch worker panic: {}", e);
            tracker.fail_job(&job_id, &msg);
            return Err(BatchError::Worker(msg));
        }
    };

    tracker.log(
        &job_id,
        LogLevel::Success,
        format!(
            "✓ Batch finished: {} succeeded, {} failed",
            summary.succeeded, summary.failed
        ),
    );
    tracker.complete_job(&job_id, serde_json::to_value(summary).ok());
    log::info!(
        "Batch job {} finished: {}/{} succeeded",
        job_id,
        summary.succeeded,
        summary.total
    );
    Ok(summary)
}
