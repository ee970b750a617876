//! Repository trait definitions for persistence.
//!
//! - [`error`]: Error types for repository operations
//! - [`dates`]: Per-date matrices, hour selections and user settings
//! - [`results`]: Stored analysis runs
//!
//! For functions that need every capability, use the [`FullRepository`] bound:
//!
//! ```ignore
//! async fn my_service<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<()> {
//!     let dates = repo.complete_dates(&user).await?;
//!     repo.delete_runs_touching(&user, dates[0]).await?;
//!     Ok(())
//! }
//! ```

pub mod dates;
pub mod error;
pub mod results;

pub use dates::DateRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use results::AnalysisResultRepository;

/// Composite trait bound for a complete repository implementation.
pub trait FullRepository: DateRepository + AnalysisResultRepository {}

impl<T> FullRepository for T where T: DateRepository + AnalysisResultRepository {}
