//! Persisted analysis runs.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::models::{AnalysisRun, UserId};

/// Repository trait for computed analysis runs, keyed by user and trigger date.
#[async_trait]
pub trait AnalysisResultRepository: Send + Sync {
    async fn get_run(
        &self,
        user: &UserId,
        trigger_date: NaiveDate,
    ) -> RepositoryResult<Option<AnalysisRun>>;

    /// Insert or replace the run for `(run.user, run.trigger_date)`.
    async fn put_run(&self, run: AnalysisRun) -> RepositoryResult<()>;

    async fn delete_run(&self, user: &UserId, trigger_date: NaiveDate) -> RepositoryResult<bool>;

    /// Trigger dates with a stored run, ascending.
    async fn list_run_dates(&self, user: &UserId) -> RepositoryResult<Vec<NaiveDate>>;

    /// Drop every run whose window includes `date`.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of runs removed
    async fn delete_runs_touching(&self, user: &UserId, date: NaiveDate)
        -> RepositoryResult<usize>;
}
