//! Repository factory for dependency injection.
//!
//! Creates repository instances from runtime configuration. Only the
//! in-memory backend exists; any other requested type is rejected.

use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::RepositoryConfig;
use super::repositories::LocalRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};

/// Environment variable selecting the repository backend.
pub const REPOSITORY_TYPE_ENV: &str = "REPOSITORY_TYPE";

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from the `REPOSITORY_TYPE` environment variable.
    ///
    /// Unset means Local. A set but unknown value is an error rather than a
    /// silent fallback.
    pub fn from_env() -> RepositoryResult<Self> {
        match std::env::var(REPOSITORY_TYPE_ENV) {
            Ok(val) => val.parse().map_err(RepositoryError::configuration),
            Err(_) => Ok(Self::Local),
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```
/// use abcd_analysis::db::{RepositoryFactory, RepositoryType};
///
/// let repo = RepositoryFactory::create(RepositoryType::Local);
/// # let _ = repo;
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    pub fn create(repo_type: RepositoryType) -> Arc<dyn FullRepository> {
        match repo_type {
            RepositoryType::Local => Self::create_local(),
        }
    }

    /// Create an in-memory local repository.
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create repository from environment configuration.
    pub fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        Ok(Self::create(RepositoryType::from_env()?))
    }

    /// Create repository from a loaded configuration.
    ///
    /// `REPOSITORY_TYPE`, when set, overrides the file's `[repository] type`.
    pub fn from_config(config: &RepositoryConfig) -> RepositoryResult<Arc<dyn FullRepository>> {
        if std::env::var(REPOSITORY_TYPE_ENV).is_ok() {
            return Self::from_env();
        }
        let repo_type = config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;
        Ok(Self::create(repo_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::DateRepository;

    #[test]
    fn test_repository_type_from_str() {
        assert_eq!("local".parse::<RepositoryType>(), Ok(RepositoryType::Local));
        assert_eq!("LOCAL".parse::<RepositoryType>(), Ok(RepositoryType::Local));
        assert_eq!("memory".parse::<RepositoryType>(), Ok(RepositoryType::Local));
        assert!("postgres".parse::<RepositoryType>().is_err());
        assert!("invalid".parse::<RepositoryType>().is_err());
    }

    #[tokio::test]
    async fn test_create_local() {
        let repo = RepositoryFactory::create_local();
        assert!(repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_from_config_defaults_to_local() {
        let config = RepositoryConfig::default();
        let repo = RepositoryFactory::from_config(&config);
        // REPOSITORY_TYPE may be set by the environment running the tests.
        if std::env::var(REPOSITORY_TYPE_ENV).is_err() {
            assert!(repo.unwrap().health_check().await.unwrap());
        }
    }
}
