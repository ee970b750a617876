//! Job tracking for background batch analysis.
//!
//! Stores status, progress and timestamped log lines for each job so clients
//! can poll or stream them over SSE.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::batch::BatchProgress;
use crate::models::UserId;

/// A single log entry with timestamp and message.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LogEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

/// Job metadata and logs.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Job {
    pub job_id: String,
    pub user: UserId,
    pub status: JobStatus,
    pub progress: Option<BatchProgress>,
    pub logs: Vec<LogEntry>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Batch summary once the job finishes.
    pub result: Option<serde_json::Value>,
}

/// In-memory job tracker.
#[derive(Clone)]
pub struct JobTracker {
    jobs: Arc<RwLock<HashMap<String, Job>>>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a running job for `user` and return its ID.
    pub fn create_job(&self, user: &UserId) -> String {
        let job_id = Uuid::new_v4().to_string();
        let job = Job {
            job_id: job_id.clone(),
            user: user.clone(),
            status: JobStatus::Running,
            progress: None,
            logs: vec![],
            created_at: chrono::Utc::now(),
            completed_at: None,
            result: None,
        };
        self.jobs.write().insert(job_id.clone(), job);
        job_id
    }

    pub fn log(&self, job_id: &str, level: LogLevel, message: impl Into<String>) {
        if let Some(job) = self.jobs.write().get_mut(job_id) {
            job.logs.push(LogEntry {
                timestamp: chrono::Utc::now(),
                level,
                message: message.into(),
            });
        }
    }

    pub fn set_progress(&self, job_id: &str, progress: BatchProgress) {
        if let Some(job) = self.jobs.write().get_mut(job_id) {
            job.progress = Some(progress);
        }
    }

    /// Mark a job as completed with optional result.
    pub fn complete_job(&self, job_id: &str, result: Option<serde_json::Value>) {
        if let Some(job) = self.jobs.write().get_mut(job_id) {
            job.status = JobStatus::Completed;
            job.completed_at = Some(chrono::Utc::now());
            job.result = result;
        }
    }

    /// Mark a job as failed, recording the reason as its last log line.
    pub fn fail_job(&self, job_id: &str, error_message: impl Into<String>) {
        if let Some(job) = self.jobs.write().get_mut(job_id) {
            job.status = JobStatus::Failed;
            job.completed_at = Some(chrono::Utc::now());
            job.logs.push(LogEntry {
                timestamp: chrono::Utc::now(),
                level: LogLevel::Error,
                message: error_message.into(),
            });
        }
    }

    pub fn get_job(&self, job_id: &str) -> Option<Job> {
        self.jobs.read().get(job_id).cloned()
    }

    pub fn get_logs(&self, job_id: &str) -> Vec<LogEntry> {
        self.jobs
            .read()
            .get(job_id)
            .map(|job| job.logs.clone())
            .unwrap_or_default()
    }

    /// Jobs of one user, newest first.
    pub fn jobs_for_user(&self, user: &UserId) -> Vec<Job> {
        let mut jobs: Vec<Job> = self
            .jobs
            .read()
            .values()
            .filter(|job| &job.user == user)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }
}

impl Default for JobTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_lifecycle() {
        let tracker = JobTracker::new();
        let user = UserId::new("u1");
        let id = tracker.create_job(&user);
        assert_eq!(tracker.get_job(&id).unwrap().status, JobStatus::Running);

        tracker.log(&id, LogLevel::Info, "started");
        tracker.set_progress(
            &id,
            BatchProgress {
                processed: 1,
                total: 2,
                percent: 50,
            },
        );
        tracker.complete_job(&id, Some(serde_json::json!({"succeeded": 2})));

        let job = tracker.get_job(&id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.completed_at.is_some());
        assert_eq!(job.progress.unwrap().percent, 50);
        assert_eq!(tracker.get_logs(&id).len(), 1);
    }

    #[test]
    fn test_fail_job_appends_error_log() {
        let tracker = JobTracker::new();
        let id = tracker.create_job(&UserId::new("u1"));
        tracker.fail_job(&id, "boom");

        let logs = tracker.get_logs(&id);
        assert_eq!(logs.last().unwrap().level, LogLevel::Error);
        assert_eq!(tracker.get_job(&id).unwrap().status, JobStatus::Failed);
    }

    #[test]
    fn test_unknown_job_is_ignored() {
        let tracker = JobTracker::new();
        tracker.log("missing", LogLevel::Info, "nothing");
        assert!(tracker.get_job("missing").is_none());
        assert!(tracker.get_logs("missing").is_empty());
    }

    #[test]
    fn test_jobs_for_user_filters() {
        let tracker = JobTracker::new();
        tracker.create_job(&UserId::new("u1"));
        tracker.create_job(&UserId::new("u2"));
        tracker.create_job(&UserId::new("u1"));
        assert_eq!(tracker.jobs_for_user(&UserId::new("u1")).len(), 2);
    }
}
