//! Date storage trait: matrices, hour selections and per-user settings.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::models::{DateRecord, HourSelection, PlanetaryMatrix, UserId};

/// Repository trait for per-date inputs.
///
/// A date becomes part of a user's catalogue once both its planetary matrix
/// and its hour selection are stored. Writing one facet twice replaces it.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait DateRepository: Send + Sync {
    /// Check if the backend is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Store (or replace) the planetary matrix of a date.
    async fn store_matrix(
        &self,
        user: &UserId,
        date: NaiveDate,
        matrix: PlanetaryMatrix,
    ) -> RepositoryResult<()>;

    /// Store (or replace) the hour selection of a date.
    async fn store_hour_selection(
        &self,
        user: &UserId,
        date: NaiveDate,
        hours: HourSelection,
    ) -> RepositoryResult<()>;

    /// Fetch whatever is stored for a date, complete or not.
    async fn get_date_record(
        &self,
        user: &UserId,
        date: NaiveDate,
    ) -> RepositoryResult<Option<DateRecord>>;

    async fn has_complete_record(&self, user: &UserId, date: NaiveDate) -> RepositoryResult<bool>;

    /// All complete dates of a user, ascending.
    async fn complete_dates(&self, user: &UserId) -> RepositoryResult<Vec<NaiveDate>>;

    /// Remove both facets of a date.
    ///
    /// # Returns
    /// * `Ok(true)` if something was removed
    async fn delete_date(&self, user: &UserId, date: NaiveDate) -> RepositoryResult<bool>;

    /// Configured number of hour slots, if the user has set one.
    async fn get_hour_count(&self, user: &UserId) -> RepositoryResult<Option<u32>>;

    async fn set_hour_count(&self, user: &UserId, count: u32) -> RepositoryResult<()>;
}
