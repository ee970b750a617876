//! Data Transfer Objects for the HTTP API.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::AnalysisRun;
use crate::services::job_tracker::{JobStatus, LogEntry};
use crate::services::{BatchProgress, WindowExplanation, WindowMode};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub repository: String,
}

/// Raw hour selection body: hour slot → planet code or name.
pub type HourSelectionBody = BTreeMap<String, String>;

/// Response for a stored date facet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreFacetResponse {
    pub user: String,
    pub date: NaiveDate,
    /// Topics for a matrix, hour slots for an hour selection.
    pub stored: usize,
    /// Both facets are now present.
    pub complete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateListResponse {
    pub user: String,
    pub dates: Vec<NaiveDate>,
    pub total: usize,
    /// Dates with at least three complete predecessors.
    pub analyzable: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsRequest {
    pub hour_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub user: String,
    pub hour_count: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindowQuery {
    #[serde(default)]
    pub mode: WindowMode,
}

/// Query parameters for the analysis endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisQuery {
    /// Comma-separated hour slots, e.g. `1,2,5`. Absent means all configured hours.
    #[serde(default)]
    pub hours: Option<String>,
    #[serde(default)]
    pub refresh: bool,
    #[serde(default)]
    pub mode: WindowMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub run: AnalysisRun,
    pub explanation: WindowExplanation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatusResponse {
    pub cached: bool,
    /// Absent when nothing is cached.
    pub stale: Option<bool>,
}

/// Request body for a batch analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRequestBody {
    #[serde(default)]
    pub triggers: Vec<NaiveDate>,
    #[serde(default)]
    pub hours: Vec<u32>,
    #[serde(default)]
    pub chunk_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub job_id: String,
    pub message: String,
}

/// Job status response for background batches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub progress: Option<BatchProgress>,
    pub logs: Vec<LogEntry>,
    pub result: Option<serde_json::Value>,
}
