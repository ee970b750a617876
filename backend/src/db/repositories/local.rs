//! In-memory local repository implementation.
//!
//! Suitable for unit tests and local development. All data lives in
//! memory behind a single `parking_lot::RwLock`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;

use crate::db::repository::*;
use crate::models::{AnalysisRun, DateRecord, HourSelection, PlanetaryMatrix, UserId};

/// In-memory local repository.
///
/// # Example
/// ```
/// use abcd_analysis::db::repositories::LocalRepository;
/// use abcd_analysis::db::repository::DateRepository;
/// use abcd_analysis::models::UserId;
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let repo = LocalRepository::new();
///     let dates = repo.complete_dates(&UserId::new("u1")).await.unwrap();
///     assert!(dates.is_empty());
/// });
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    records: HashMap<UserId, BTreeMap<NaiveDate, DateRecord>>,
    runs: HashMap<UserId, BTreeMap<NaiveDate, AnalysisRun>>,
    hour_counts: HashMap<UserId, u32>,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            runs: HashMap::new(),
            hour_counts: HashMap::new(),
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        let healthy = data.is_healthy;
        *data = LocalData {
            is_healthy: healthy,
            ..Default::default()
        };
    }

    /// Number of stored runs across all users.
    pub fn run_count(&self) -> usize {
        self.data.read().runs.values().map(BTreeMap::len).sum()
    }

    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection("Local repository is not healthy")
                .with_operation(operation));
        }
        Ok(())
    }

    fn upsert_record<F>(&self, user: &UserId, date: NaiveDate, apply: F)
    where
        F: FnOnce(&mut DateRecord),
    {
        let mut data = self.data.write();
        let record = data
            .records
            .entry(user.clone())
            .or_default()
            .entry(date)
            .or_insert_with(|| DateRecord::new(user.clone(), date));
        apply(record);
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DateRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn store_matrix(
        &self,
        user: &UserId,
        date: NaiveDate,
        matrix: PlanetaryMatrix,
    ) -> RepositoryResult<()> {
        self.check_health("store_matrix")?;
        self.upsert_record(user, date, |record| record.matrix = Some(matrix));
        Ok(())
    }

    async fn store_hour_selection(
        &self,
        user: &UserId,
        date: NaiveDate,
        hours: HourSelection,
    ) -> RepositoryResult<()> {
        self.check_health("store_hour_selection")?;
        self.upsert_record(user, date, |record| record.hours = Some(hours));
        Ok(())
    }

    async fn get_date_record(
        &self,
        user: &UserId,
        date: NaiveDate,
    ) -> RepositoryResult<Option<DateRecord>> {
        self.check_health("get_date_record")?;
        let data = self.data.read();
        Ok(data
            .records
            .get(user)
            .and_then(|dates| dates.get(&date))
            .cloned())
    }

    async fn has_complete_record(&self, user: &UserId, date: NaiveDate) -> RepositoryResult<bool> {
        self.check_health("has_complete_record")?;
        let data = self.data.read();
        Ok(data
            .records
            .get(user)
            .and_then(|dates| dates.get(&date))
            .is_some_and(DateRecord::is_complete))
    }

    async fn complete_dates(&self, user: &UserId) -> RepositoryResult<Vec<NaiveDate>> {
        self.check_health("complete_dates")?;
        let data = self.data.read();
        Ok(data
            .records
            .get(user)
            .map(|dates| {
                dates
                    .values()
                    .filter(|record| record.is_complete())
                    .map(|record| record.date)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete_date(&self, user: &UserId, date: NaiveDate) -> RepositoryResult<bool> {
        self.check_health("delete_date")?;
        let mut data = self.data.write();
        Ok(data
            .records
            .get_mut(user)
            .and_then(|dates| dates.remove(&date))
            .is_some())
    }

    async fn get_hour_count(&self, user: &UserId) -> RepositoryResult<Option<u32>> {
        self.check_health("get_hour_count")?;
        Ok(self.data.read().hour_counts.get(user).copied())
    }

    async fn set_hour_count(&self, user: &UserId, count: u32) -> RepositoryResult<()> {
        self.check_health("set_hour_count")?;
        self.data.write().hour_counts.insert(user.clone(), count);
        Ok(())
    }
}

#[async_trait]
impl AnalysisResultRepository for LocalRepository {
    async fn get_run(
        &self,
        user: &UserId,
        trigger_date: NaiveDate,
    ) -> RepositoryResult<Option<AnalysisRun>> {
        self.check_health("get_run")?;
        let data = self.data.read();
        Ok(data
            .runs
            .get(user)
            .and_then(|runs| runs.get(&trigger_date))
            .cloned())
    }

    async fn put_run(&self, run: AnalysisRun) -> RepositoryResult<()> {
        self.check_health("put_run")?;
        let mut data = self.data.write();
        data.runs
            .entry(run.user.clone())
            .or_default()
            .insert(run.trigger_date, run);
        Ok(())
    }

    async fn delete_run(&self, user: &UserId, trigger_date: NaiveDate) -> RepositoryResult<bool> {
        self.check_health("delete_run")?;
        let mut data = self.data.write();
        Ok(data
            .runs
            .get_mut(user)
            .and_then(|runs| runs.remove(&trigger_date))
            .is_some())
    }

    async fn list_run_dates(&self, user: &UserId) -> RepositoryResult<Vec<NaiveDate>> {
        self.check_health("list_run_dates")?;
        let data = self.data.read();
        Ok(data
            .runs
            .get(user)
            .map(|runs| runs.keys().copied().collect())
            .unwrap_or_default())
    }

    async fn delete_runs_touching(
        &self,
        user: &UserId,
        date: NaiveDate,
    ) -> RepositoryResult<usize> {
        self.check_health("delete_runs_touching")?;
        let mut data = self.data.write();
        let Some(runs) = data.runs.get_mut(user) else {
            return Ok(0);
        };
        let before = runs.len();
        runs.retain(|_, run| !run.window.contains(date));
        Ok(before - runs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisWindow, PlanetCode};
    use chrono::Utc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    fn run(user: &UserId, a: u32, b: u32, c: u32, d: u32) -> AnalysisRun {
        AnalysisRun {
            user: user.clone(),
            trigger_date: day(d),
            window: AnalysisWindow {
                a: day(a),
                b: day(b),
                c: day(c),
                d: day(d),
            },
            hours: Default::default(),
            input_fingerprint: String::new(),
            computed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_date_complete_only_with_both_facets() {
        let repo = LocalRepository::new();
        let user = UserId::new("u1");

        repo.store_matrix(&user, day(1), PlanetaryMatrix::new())
            .await
            .unwrap();
        assert!(!repo.has_complete_record(&user, day(1)).await.unwrap());
        assert!(repo.complete_dates(&user).await.unwrap().is_empty());

        repo.store_hour_selection(&user, day(1), HourSelection::new().with(1, PlanetCode::Su))
            .await
            .unwrap();
        assert!(repo.has_complete_record(&user, day(1)).await.unwrap());
        assert_eq!(repo.complete_dates(&user).await.unwrap(), vec![day(1)]);
    }

    #[tokio::test]
    async fn test_complete_dates_sorted_and_scoped_by_user() {
        let repo = LocalRepository::new();
        let u1 = UserId::new("u1");
        let u2 = UserId::new("u2");
        for (user, d) in [(&u1, 8), (&u1, 3), (&u2, 5), (&u1, 7)] {
            repo.store_matrix(user, day(d), PlanetaryMatrix::new())
                .await
                .unwrap();
            repo.store_hour_selection(user, day(d), HourSelection::new())
                .await
                .unwrap();
        }
        assert_eq!(
            repo.complete_dates(&u1).await.unwrap(),
            vec![day(3), day(7), day(8)]
        );
        assert_eq!(repo.complete_dates(&u2).await.unwrap(), vec![day(5)]);
    }

    #[tokio::test]
    async fn test_delete_runs_touching_only_matching_windows() {
        let repo = LocalRepository::new();
        let user = UserId::new("u1");
        repo.put_run(run(&user, 1, 2, 3, 4)).await.unwrap();
        repo.put_run(run(&user, 2, 3, 4, 5)).await.unwrap();
        repo.put_run(run(&user, 5, 6, 7, 8)).await.unwrap();

        let removed = repo.delete_runs_touching(&user, day(2)).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(repo.list_run_dates(&user).await.unwrap(), vec![day(8)]);
    }

    #[tokio::test]
    async fn test_put_run_replaces_wholesale() {
        let repo = LocalRepository::new();
        let user = UserId::new("u1");
        let mut first = run(&user, 1, 2, 3, 4);
        first.input_fingerprint = "old".into();
        repo.put_run(first).await.unwrap();
        let mut second = run(&user, 1, 2, 3, 4);
        second.input_fingerprint = "new".into();
        repo.put_run(second).await.unwrap();

        let stored = repo.get_run(&user, day(4)).await.unwrap().unwrap();
        assert_eq!(stored.input_fingerprint, "new");
        assert_eq!(repo.run_count(), 1);
    }

    #[tokio::test]
    async fn test_unhealthy_repository_rejects_operations() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
        let err = repo
            .complete_dates(&UserId::new("u1"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ConnectionError { .. }));
        assert_eq!(err.context().operation.as_deref(), Some("complete_dates"));
    }
}
