//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repo_config::AnalysisSettings;
use crate::db::repository::FullRepository;
use crate::services::job_tracker::JobTracker;
use crate::services::run_cache::AnalysisRunCache;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn FullRepository>,
    pub run_cache: AnalysisRunCache,
    pub job_tracker: JobTracker,
    pub settings: AnalysisSettings,
}

impl AppState {
    /// State with default analysis settings.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self::with_settings(repository, AnalysisSettings::default())
    }

    pub fn with_settings(repository: Arc<dyn FullRepository>, settings: AnalysisSettings) -> Self {
        Self {
            run_cache: AnalysisRunCache::new(repository.clone(), settings.default_hour_count),
            repository,
            job_tracker: JobTracker::new(),
            settings,
        }
    }
}
