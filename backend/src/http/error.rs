//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::algorithms::WindowError;
use crate::db::repository::RepositoryError;
use crate::services::{AnalysisError, BatchError};

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
    Repository(RepositoryError),
    /// No valid A/B/C/D window for the requested date.
    Window(WindowError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Repository(e) => match e {
                RepositoryError::NotFound { .. } => {
                    (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", e.to_string()))
                }
                RepositoryError::ValidationError { .. } => {
                    (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", e.to_string()))
                }
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("REPOSITORY_ERROR", e.to_string()),
                ),
            },
            AppError::Window(e) => {
                let code = match e {
                    WindowError::InsufficientHistory { .. } => "INSUFFICIENT_HISTORY",
                    WindowError::NoPriorDate { .. } => "NO_PRIOR_DATE",
                    WindowError::NotInCatalogue { .. } => "DATE_NOT_ANALYZABLE",
                };
                let details = match e {
                    WindowError::InsufficientHistory {
                        preceding,
                        required,
                        ..
                    } => format!("preceding={}, required={}", preceding, required),
                    WindowError::NoPriorDate { reference } => format!("reference={}", reference),
                    WindowError::NotInCatalogue { date } => format!("date={}", date),
                };
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ApiError::new(code, e.to_string()).with_details(details),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<WindowError> for AppError {
    fn from(err: WindowError) -> Self {
        AppError::Window(err)
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Window(e) => AppError::Window(e),
            AnalysisError::Repository(e) => AppError::Repository(e),
            AnalysisError::Task(msg) => AppError::Internal(msg),
        }
    }
}

impl From<BatchError> for AppError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::InvalidChunkSize | BatchError::InvalidChannelCapacity => {
                AppError::BadRequest(err.to_string())
            }
            BatchError::Repository(e) => AppError::Repository(e),
            BatchError::Worker(msg) => AppError::Internal(msg),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
