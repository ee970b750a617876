//! Repository and analysis configuration file support.
//!
//! Settings are read from a `repository.toml` file:
//!
//! ```toml
//! [repository]
//! type = "local"
//!
//! [analysis]
//! default_hour_count = 24
//! batch_chunk_size = 5
//! channel_capacity = 16
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::factory::RepositoryType;
use super::repository::{ErrorContext, RepositoryError};
use crate::models::MAX_HOUR_COUNT;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "ANALYSIS_CONFIG";

/// Repository configuration from file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type", default = "default_repo_type")]
    pub repo_type: String,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: default_repo_type(),
        }
    }
}

/// Tunables of the analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Hour slots analyzed when a user has not configured a count.
    #[serde(default = "default_hour_count")]
    pub default_hour_count: u32,
    /// Trigger dates per worker chunk.
    #[serde(default = "default_batch_chunk_size")]
    pub batch_chunk_size: usize,
    /// Capacity of the worker message channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            default_hour_count: default_hour_count(),
            batch_chunk_size: default_batch_chunk_size(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_repo_type() -> String {
    "local".to_string()
}

fn default_hour_count() -> u32 {
    24
}

fn default_batch_chunk_size() -> usize {
    5
}

fn default_channel_capacity() -> usize {
    16
}

impl RepositoryConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(RepositoryConfig)` if successful
    /// * `Err(RepositoryError)` if the file cannot be read, parsed or validated
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RepositoryError::ConfigurationError {
                message: format!("Failed to read config file: {}", e),
                context: ErrorContext::new("load_config").with_details(path.display().to_string()),
            }
        })?;

        let config: RepositoryConfig = toml::from_str(&content).map_err(|e| {
            RepositoryError::ConfigurationError {
                message: format!("Failed to parse config file: {}", e),
                context: ErrorContext::new("load_config").with_details(path.display().to_string()),
            }
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `repository.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        match Self::default_path() {
            Some(path) => Self::from_file(path),
            None => Err(RepositoryError::configuration(
                "No repository.toml found in standard locations",
            )),
        }
    }

    /// Resolve configuration the way the server does.
    ///
    /// `ANALYSIS_CONFIG` wins when set (a missing file is an error). Otherwise
    /// the default locations are searched, falling back to built-in defaults.
    pub fn load() -> Result<Self, RepositoryError> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) => Self::from_file(path),
            None => {
                log::debug!("No repository.toml found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn default_path() -> Option<PathBuf> {
        [
            PathBuf::from("repository.toml"),
            PathBuf::from("backend/repository.toml"),
            PathBuf::from("../repository.toml"),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repository.repo_type)
    }

    fn validate(&self) -> Result<(), RepositoryError> {
        self.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;
        if !(1..=MAX_HOUR_COUNT).contains(&self.analysis.default_hour_count) {
            return Err(RepositoryError::configuration(format!(
                "analysis.default_hour_count must be between 1 and {}",
                MAX_HOUR_COUNT
            )));
        }
        if self.analysis.batch_chunk_size == 0 {
            return Err(RepositoryError::configuration(
                "analysis.batch_chunk_size must be at least 1",
            ));
        }
        if self.analysis.channel_capacity == 0 {
            return Err(RepositoryError::configuration(
                "analysis.channel_capacity must be at least 1",
            ));
        }
        Ok(())
    }
}
