//! Chunked batch analysis on a blocking worker thread.
//!
//! The worker owns a snapshot of the user's complete dates and walks the
//! requested trigger dates in fixed-size chunks, one chunk at a time. All
//! communication with the caller goes through a bounded channel of
//! [`WorkerMessage`]s, so a slow consumer naturally throttles the worker.
//! Dropping the receiver is the only way to cancel; the worker notices at
//! its next send and stops.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::aggregator::AnalysisAggregator;
use super::error::BatchError;
use crate::algorithms::DateSequenceResolver;
use crate::db::repo_config::AnalysisSettings;
use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::{AnalysisRun, DateInputs, HourSlot, TopicKey, UserId, WindowInputs};

/// Work description for one batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub user: UserId,
    /// Trigger dates (each is D). Empty means every analyzable date.
    #[serde(default)]
    pub triggers: Vec<NaiveDate>,
    #[serde(default)]
    pub hours: Vec<HourSlot>,
    /// Empty means the topics of each D-day matrix.
    #[serde(default)]
    pub topics: Vec<TopicKey>,
}

/// Progress counters reported after every chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchProgress {
    pub processed: usize,
    pub total: usize,
    /// Rounded percentage, 0..=100.
    pub percent: u32,
}

impl BatchProgress {
    fn new(processed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            100
        } else {
            ((processed as f64 / total as f64) * 100.0).round() as u32
        };
        Self {
            processed,
            total,
            percent,
        }
    }
}

/// Tagged messages emitted by the worker, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerMessage {
    Started { total: usize, chunk_size: usize },
    Progress(BatchProgress),
    /// One trigger date could not be analyzed; the batch continues.
    ItemFailed { trigger: NaiveDate, error: String },
    Result { run: Box<AnalysisRun> },
    /// A whole chunk failed; remaining chunks still run.
    Error { chunk: usize, message: String },
}

/// Final counts of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// True when the receiver went away before the batch finished.
    pub cancelled: bool,
}

/// Read-only copy of a user's complete dates taken before the worker starts.
#[derive(Debug, Clone)]
pub struct BatchSnapshot {
    resolver: DateSequenceResolver,
    inputs: HashMap<NaiveDate, DateInputs>,
}

impl BatchSnapshot {
    pub fn new(inputs: HashMap<NaiveDate, DateInputs>) -> Self {
        Self {
            resolver: DateSequenceResolver::new(inputs.keys().copied()),
            inputs,
        }
    }

    /// Load every complete date of `user`.
    pub async fn load<R: FullRepository + ?Sized>(
        repo: &R,
        user: &UserId,
    ) -> RepositoryResult<Self> {
        let mut inputs = HashMap::new();
        for date in repo.complete_dates(user).await? {
            if let Some(record) = repo.get_date_record(user, date).await? {
                if let Some(date_inputs) = record.inputs() {
                    inputs.insert(date, date_inputs);
                }
            }
        }
        Ok(Self::new(inputs))
    }

    pub fn resolver(&self) -> &DateSequenceResolver {
        &self.resolver
    }

    fn window_inputs(&self, dates: [NaiveDate; 4]) -> Option<WindowInputs> {
        let [a, b, c, d] = dates.map(|date| self.inputs.get(&date).cloned());
        Some(WindowInputs {
            a: a?,
            b: b?,
            c: c?,
            d: d?,
        })
    }
}

/// Chunked batch runner.
#[derive(Debug, Clone, Copy)]
pub struct BatchWorker {
    chunk_size: usize,
    channel_capacity: usize,
}

impl BatchWorker {
    pub fn new(chunk_size: usize, channel_capacity: usize) -> Result<Self, BatchError> {
        if chunk_size == 0 {
            return Err(BatchError::InvalidChunkSize);
        }
        if channel_capacity == 0 {
            return Err(BatchError::InvalidChannelCapacity);
        }
        Ok(Self {
            chunk_size,
            channel_capacity,
        })
    }

    pub fn from_settings(settings: &AnalysisSettings) -> Result<Self, BatchError> {
        Self::new(settings.batch_chunk_size, settings.channel_capacity)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Start the worker on the blocking pool.
    ///
    /// The receiver yields messages until the batch ends; the handle resolves
    /// to the summary.
    pub fn spawn(
        &self,
        request: BatchRequest,
        snapshot: BatchSnapshot,
    ) -> (mpsc::Receiver<WorkerMessage>, JoinHandle<BatchSummary>) {
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let worker = *self;
        let handle = tokio::task::spawn_blocking(move || worker.process(&request, &snapshot, &tx));
        (rx, handle)
    }

    /// Run the batch on the current thread.
    ///
    /// Must not be called from an async context: sends block when the
    /// channel is full.
    pub fn process(
        &self,
        request: &BatchRequest,
        snapshot: &BatchSnapshot,
        tx: &mpsc::Sender<WorkerMessage>,
    ) -> BatchSummary {
        self.process_with(request, snapshot, tx, analyze_one)
    }

    fn process_with<F>(
        &self,
        request: &BatchRequest,
        snapshot: &BatchSnapshot,
        tx: &mpsc::Sender<WorkerMessage>,
        analyze: F,
    ) -> BatchSummary
    where
        F: Fn(&BatchRequest, &BatchSnapshot, NaiveDate) -> Result<AnalysisRun, String>,
    {
        let triggers: Vec<NaiveDate> = if request.triggers.is_empty() {
            snapshot.resolver().analyzable_dates().to_vec()
        } else {
            request.triggers.clone()
        };
        let mut summary = BatchSummary {
            total: triggers.len(),
            ..Default::default()
        };

        if tx
            .blocking_send(WorkerMessage::Started {
                total: summary.total,
                chunk_size: self.chunk_size,
            })
            .is_err()
        {
            summary.cancelled = true;
            return summary;
        }

        let mut processed = 0;
        for (index, chunk) in triggers.chunks(self.chunk_size).enumerate() {
            if tx.is_closed() {
                debug!("Batch receiver dropped before chunk {}", index);
                summary.cancelled = true;
                return summary;
            }

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                chunk
                    .iter()
                    .map(|&trigger| (trigger, analyze(request, snapshot, trigger)))
                    .collect::<Vec<_>>()
            }));

            let messages = match outcome {
                Ok(results) => results
                    .into_iter()
                    .map(|(trigger, result)| match result {
                        Ok(run) => {
                            summary.succeeded += 1;
                            WorkerMessage::Result { run: Box::new(run) }
                        }
                        Err(error) => {
                            summary.failed += 1;
                            WorkerMessage::ItemFailed { trigger, error }
                        }
                    })
                    .collect::<Vec<_>>(),
                Err(_) => {
                    warn!("Batch chunk {} panicked", index);
                    summary.failed += chunk.len();
                    vec![WorkerMessage::Error {
                        chunk: index,
                        message: format!("chunk {} aborted ({} dates)", index, chunk.len()),
                    }]
                }
            };

            processed += chunk.len();
            let progress = WorkerMessage::Progress(BatchProgress::new(processed, summary.total));
            for message in messages.into_iter().chain(std::iter::once(progress)) {
                if tx.blocking_send(message).is_err() {
                    summary.cancelled = true;
                    return summary;
                }
            }
        }

        summary
    }
}

fn analyze_one(
    request: &BatchRequest,
    snapshot: &BatchSnapshot,
    trigger: NaiveDate,
) -> Result<AnalysisRun, String> {
    let window = snapshot
        .resolver()
        .window_ending_at(trigger)
        .map_err(|e| e.to_string())?;
    let inputs = snapshot
        .window_inputs(window.dates())
        .ok_or_else(|| format!("inputs missing for window {}", window))?;
    Ok(AnalysisAggregator::run(
        &request.user,
        window,
        &inputs,
        &request.hours,
        &request.topics,
    ))
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod batch_tests;
