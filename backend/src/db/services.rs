//! High-level database service layer.
//!
//! Repository-agnostic operations shared by the HTTP handlers and the
//! analysis services. Every write of a date facet also drops the cached runs
//! whose window contains that date, so the next request recomputes them
//! wholesale.
//!
//! # Usage
//!
//! ```no_run
//! use abcd_analysis::db::{services, repositories::LocalRepository};
//! use abcd_analysis::models::UserId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     let dates = services::list_complete_dates(&repo, &UserId::new("u1")).await?;
//!     println!("Found {} complete dates", dates.len());
//!     Ok(())
//! }
//! ```

use chrono::NaiveDate;
use log::{debug, info};

use super::repository::{ErrorContext, FullRepository, RepositoryError, RepositoryResult};
use crate::algorithms::DateSequenceResolver;
use crate::models::{
    AnalysisWindow, DateInputs, HourSelection, PlanetaryMatrix, RawMatrix, UserId, WindowInputs,
    MAX_HOUR_COUNT,
};

// ==================== Health & Connection ====================

/// Check if the repository is reachable.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Date Inputs ====================

/// Canonicalize and store the planetary matrix of a date.
///
/// # Returns
/// * `Ok(usize)` - Number of topics stored
/// * `Err(RepositoryError::ValidationError)` - Topic names that cannot be
///   canonicalized, or two names collapsing to the same topic
pub async fn store_matrix<R: FullRepository + ?Sized>(
    repo: &R,
    user: &UserId,
    date: NaiveDate,
    raw: &RawMatrix,
) -> RepositoryResult<usize> {
    ensure_user(user, "store_matrix")?;
    let matrix = PlanetaryMatrix::ingest(raw)?;
    let topics = matrix.len();
    repo.store_matrix(user, date, matrix).await?;
    let dropped = repo.delete_runs_touching(user, date).await?;
    info!(
        "Stored matrix for {} on {} ({} topics, {} cached runs invalidated)",
        user, date, topics, dropped
    );
    Ok(topics)
}

/// Store the hour selection of a date.
pub async fn store_hour_selection<R: FullRepository + ?Sized>(
    repo: &R,
    user: &UserId,
    date: NaiveDate,
    hours: HourSelection,
) -> RepositoryResult<()> {
    ensure_user(user, "store_hour_selection")?;
    let slots = hours.hours().len();
    repo.store_hour_selection(user, date, hours).await?;
    let dropped = repo.delete_runs_touching(user, date).await?;
    info!(
        "Stored hour selection for {} on {} ({} slots, {} cached runs invalidated)",
        user, date, slots, dropped
    );
    Ok(())
}

/// Remove a date and every cached run that used it.
pub async fn delete_date<R: FullRepository + ?Sized>(
    repo: &R,
    user: &UserId,
    date: NaiveDate,
) -> RepositoryResult<bool> {
    let removed = repo.delete_date(user, date).await?;
    if removed {
        let dropped = repo.delete_runs_touching(user, date).await?;
        info!(
            "Deleted {} for {} ({} cached runs invalidated)",
            date, user, dropped
        );
    }
    Ok(removed)
}

/// All complete dates of a user, ascending.
pub async fn list_complete_dates<R: FullRepository + ?Sized>(
    repo: &R,
    user: &UserId,
) -> RepositoryResult<Vec<NaiveDate>> {
    repo.complete_dates(user).await
}

/// Build a window resolver over the user's current catalogue.
pub async fn load_resolver<R: FullRepository + ?Sized>(
    repo: &R,
    user: &UserId,
) -> RepositoryResult<DateSequenceResolver> {
    let dates = repo.complete_dates(user).await?;
    debug!("Catalogue for {} has {} complete dates", user, dates.len());
    Ok(DateSequenceResolver::new(dates))
}

/// Fetch the complete inputs of the four window dates.
pub async fn load_window_inputs<R: FullRepository + ?Sized>(
    repo: &R,
    user: &UserId,
    window: &AnalysisWindow,
) -> RepositoryResult<WindowInputs> {
    Ok(WindowInputs {
        a: load_date_inputs(repo, user, window.a).await?,
        b: load_date_inputs(repo, user, window.b).await?,
        c: load_date_inputs(repo, user, window.c).await?,
        d: load_date_inputs(repo, user, window.d).await?,
    })
}

async fn load_date_inputs<R: FullRepository + ?Sized>(
    repo: &R,
    user: &UserId,
    date: NaiveDate,
) -> RepositoryResult<DateInputs> {
    repo.get_date_record(user, date)
        .await?
        .and_then(|record| record.inputs())
        .ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("No complete record for {}", date),
                ErrorContext::new("load_window_inputs")
                    .with_entity("date_record")
                    .with_entity_id(format!("{}/{}", user, date)),
            )
        })
}

// ==================== User Settings ====================

/// The user's configured hour count, or `default` if never set.
pub async fn resolve_hour_count<R: FullRepository + ?Sized>(
    repo: &R,
    user: &UserId,
    default: u32,
) -> RepositoryResult<u32> {
    Ok(repo.get_hour_count(user).await?.unwrap_or(default))
}

pub async fn set_hour_count<R: FullRepository + ?Sized>(
    repo: &R,
    user: &UserId,
    count: u32,
) -> RepositoryResult<()> {
    ensure_user(user, "set_hour_count")?;
    if !(1..=MAX_HOUR_COUNT).contains(&count) {
        return Err(RepositoryError::validation_with_context(
            format!("Hour count must be between 1 and {}", MAX_HOUR_COUNT),
            ErrorContext::new("set_hour_count")
                .with_entity_id(user)
                .with_details(format!("count={}", count)),
        ));
    }
    repo.set_hour_count(user, count).await
}

fn ensure_user(user: &UserId, operation: &str) -> RepositoryResult<()> {
    if user.as_str().trim().is_empty() {
        return Err(RepositoryError::validation_with_context(
            "User id must not be empty",
            ErrorContext::new(operation).with_entity("user"),
        ));
    }
    Ok(())
}
