//! HTTP handlers for the REST API.
//!
//! Each handler parses path and body input, then delegates to the db service
//! layer or the analysis services.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, Sse},
    Json,
};
use chrono::NaiveDate;
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;

use super::dto::{
    AnalysisQuery, AnalysisResponse, BatchRequestBody, BatchResponse, DateListResponse,
    HealthResponse, HourSelectionBody, JobStatusResponse, RunStatusResponse, SettingsRequest,
    SettingsResponse, StoreFacetResponse, WindowQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::repository::DateRepository;
use crate::db::services as db_services;
use crate::models::{HourSelection, HourSlot, PlanetCode, RawMatrix, UserId, MAX_HOUR_COUNT};
use crate::services::job_tracker::JobStatus;
use crate::services::{
    check_new_date, explain_window, recommended_sequence, run_batch_job, BatchRequest,
    BatchWorker, NewDateCheck, RecommendedSequence, WindowExplanation, WindowMode,
};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))
}

fn parse_hours(raw: Option<&str>) -> Result<Vec<HourSlot>, AppError> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(|part| parse_hour(part.trim()))
        .collect()
}

fn parse_hour(raw: &str) -> Result<HourSlot, AppError> {
    raw.parse::<u32>()
        .ok()
        .and_then(|hour| hour_slot(hour).ok())
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Invalid hour slot '{}', expected an integer in 1..={}",
                raw, MAX_HOUR_COUNT
            ))
        })
}

fn hour_slot(hour: u32) -> Result<HourSlot, AppError> {
    if !(1..=MAX_HOUR_COUNT).contains(&hour) {
        return Err(AppError::BadRequest(format!(
            "Hour slot {} out of range 1..={}",
            hour, MAX_HOUR_COUNT
        )));
    }
    Ok(HourSlot::new(hour))
}

fn parse_hour_selection(body: HourSelectionBody) -> Result<HourSelection, AppError> {
    body.into_iter()
        .map(|(hour, planet)| {
            let planet: PlanetCode = planet
                .parse()
                .map_err(|e| AppError::BadRequest(format!("Hour {}: {}", hour, e)))?;
            Ok((parse_hour(hour.trim())?, planet))
        })
        .collect()
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let repo_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        repository: repo_status,
    }))
}

// =============================================================================
// Date Inputs
// =============================================================================

/// PUT /v1/users/{user}/dates/{date}/matrix
pub async fn put_matrix(
    State(state): State<AppState>,
    Path((user, date)): Path<(String, String)>,
    Json(raw): Json<RawMatrix>,
) -> HandlerResult<StoreFacetResponse> {
    let date = parse_date(&date)?;
    let user = UserId::new(user);
    let stored = db_services::store_matrix(state.repository.as_ref(), &user, date, &raw).await?;
    let complete = state.repository.has_complete_record(&user, date).await?;

    Ok(Json(StoreFacetResponse {
        user: user.to_string(),
        date,
        stored,
        complete,
    }))
}

/// PUT /v1/users/{user}/dates/{date}/hours
pub async fn put_hours(
    State(state): State<AppState>,
    Path((user, date)): Path<(String, String)>,
    Json(body): Json<HourSelectionBody>,
) -> HandlerResult<StoreFacetResponse> {
    let date = parse_date(&date)?;
    let user = UserId::new(user);
    let hours = parse_hour_selection(body)?;
    let stored = hours.hours().len();
    db_services::store_hour_selection(state.repository.as_ref(), &user, date, hours).await?;
    let complete = state.repository.has_complete_record(&user, date).await?;

    Ok(Json(StoreFacetResponse {
        user: user.to_string(),
        date,
        stored,
        complete,
    }))
}

/// GET /v1/users/{user}/dates
pub async fn list_dates(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> HandlerResult<DateListResponse> {
    let user = UserId::new(user);
    let resolver = db_services::load_resolver(state.repository.as_ref(), &user).await?;

    Ok(Json(DateListResponse {
        user: user.to_string(),
        total: resolver.len(),
        analyzable: resolver.analyzable_dates().to_vec(),
        dates: resolver.catalogue().to_vec(),
    }))
}

/// DELETE /v1/users/{user}/dates/{date}
pub async fn delete_date(
    State(state): State<AppState>,
    Path((user, date)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let date = parse_date(&date)?;
    let user = UserId::new(user);
    if db_services::delete_date(state.repository.as_ref(), &user, date).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("No data for {} on {}", user, date)))
    }
}

/// GET /v1/users/{user}/dates/{date}/check
///
/// Calendar check before adding `date`.
pub async fn check_date(
    State(state): State<AppState>,
    Path((user, date)): Path<(String, String)>,
) -> HandlerResult<NewDateCheck> {
    let date = parse_date(&date)?;
    let catalogue =
        db_services::list_complete_dates(state.repository.as_ref(), &UserId::new(user)).await?;
    Ok(Json(check_new_date(&catalogue, date)))
}

/// GET /v1/users/{user}/sequence/{target}
pub async fn get_sequence(
    State(state): State<AppState>,
    Path((user, target)): Path<(String, String)>,
) -> HandlerResult<RecommendedSequence> {
    let target = parse_date(&target)?;
    let catalogue =
        db_services::list_complete_dates(state.repository.as_ref(), &UserId::new(user)).await?;
    Ok(Json(recommended_sequence(&catalogue, target)))
}

// =============================================================================
// Settings
// =============================================================================

/// PUT /v1/users/{user}/settings
pub async fn put_settings(
    State(state): State<AppState>,
    Path(user): Path<String>,
    Json(request): Json<SettingsRequest>,
) -> HandlerResult<SettingsResponse> {
    let user = UserId::new(user);
    db_services::set_hour_count(state.repository.as_ref(), &user, request.hour_count).await?;
    Ok(Json(SettingsResponse {
        user: user.to_string(),
        hour_count: request.hour_count,
    }))
}

/// GET /v1/users/{user}/settings
pub async fn get_settings(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> HandlerResult<SettingsResponse> {
    let user = UserId::new(user);
    let hour_count = db_services::resolve_hour_count(
        state.repository.as_ref(),
        &user,
        state.settings.default_hour_count,
    )
    .await?;
    Ok(Json(SettingsResponse {
        user: user.to_string(),
        hour_count,
    }))
}

// =============================================================================
// Analysis
// =============================================================================

/// GET /v1/users/{user}/window/{date}?mode=ending_at|before
pub async fn get_window(
    State(state): State<AppState>,
    Path((user, date)): Path<(String, String)>,
    Query(query): Query<WindowQuery>,
) -> HandlerResult<WindowExplanation> {
    let date = parse_date(&date)?;
    let window = state
        .run_cache
        .resolve_window(&UserId::new(user), date, query.mode)
        .await?;
    Ok(Json(explain_window(&window)))
}

/// GET /v1/users/{user}/analysis/{date}?hours=1,2&refresh=true&mode=...
pub async fn get_analysis(
    State(state): State<AppState>,
    Path((user, date)): Path<(String, String)>,
    Query(query): Query<AnalysisQuery>,
) -> HandlerResult<AnalysisResponse> {
    let date = parse_date(&date)?;
    let user = UserId::new(user);
    let hours = parse_hours(query.hours.as_deref())?;

    let run = match query.mode {
        WindowMode::EndingAt => {
            state
                .run_cache
                .get_or_compute(&user, date, &hours, query.refresh)
                .await?
        }
        WindowMode::Before => {
            state
                .run_cache
                .get_or_compute_before(&user, date, &hours, query.refresh)
                .await?
        }
    };

    Ok(Json(AnalysisResponse {
        explanation: explain_window(&run.window),
        run,
    }))
}

/// GET /v1/users/{user}/analysis/{date}/status
pub async fn get_analysis_status(
    State(state): State<AppState>,
    Path((user, date)): Path<(String, String)>,
) -> HandlerResult<RunStatusResponse> {
    let date = parse_date(&date)?;
    let stale = state.run_cache.is_stale(&UserId::new(user), date).await?;
    Ok(Json(RunStatusResponse {
        cached: stale.is_some(),
        stale,
    }))
}

// =============================================================================
// Batch Jobs
// =============================================================================

/// POST /v1/users/{user}/batch
///
/// Start a background batch analysis. Returns a job ID for tracking progress.
pub async fn start_batch(
    State(state): State<AppState>,
    Path(user): Path<String>,
    Json(body): Json<BatchRequestBody>,
) -> Result<(StatusCode, Json<BatchResponse>), AppError> {
    let user = UserId::new(user);
    let hours = body
        .hours
        .iter()
        .map(|&hour| hour_slot(hour))
        .collect::<Result<Vec<_>, _>>()?;
    let worker = BatchWorker::new(
        body.chunk_size.unwrap_or(state.settings.batch_chunk_size),
        state.settings.channel_capacity,
    )?;

    let job_id = state.job_tracker.create_job(&user);
    let request = BatchRequest {
        user,
        triggers: body.triggers,
        hours,
        topics: Vec::new(),
    };

    let tracker = state.job_tracker.clone();
    let cache = state.run_cache.clone();
    let background_id = job_id.clone();
    tokio::spawn(async move {
        let _ = run_batch_job(background_id, tracker, cache, worker, request).await;
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(BatchResponse {
            message: format!(
                "Batch analysis started. Track progress at /v1/jobs/{}/logs",
                job_id
            ),
            job_id,
        }),
    ))
}

/// GET /v1/jobs/{job_id}
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> HandlerResult<JobStatusResponse> {
    let job = state
        .job_tracker
        .get_job(&job_id)
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))?;

    Ok(Json(JobStatusResponse {
        job_id: job.job_id,
        status: job.status,
        progress: job.progress,
        logs: job.logs,
        result: job.result,
    }))
}

/// GET /v1/jobs/{job_id}/logs
///
/// Stream job logs via Server-Sent Events (SSE).
pub async fn stream_job_logs(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    if state.job_tracker.get_job(&job_id).is_none() {
        return Err(AppError::NotFound(format!("Job {} not found", job_id)));
    }

    let tracker = state.job_tracker.clone();
    let stream = async_stream::stream! {
        let mut sent = 0;
        loop {
            let logs = tracker.get_logs(&job_id);
            for entry in logs.iter().skip(sent) {
                let data = serde_json::to_string(entry).unwrap_or_default();
                yield Ok(Event::default().data(data));
            }
            sent = logs.len();

            match tracker.get_job(&job_id) {
                Some(job) if job.status != JobStatus::Running => {
                    let final_event = serde_json::json!({
                        "status": job.status,
                        "progress": job.progress,
                        "result": job.result,
                    });
                    yield Ok(Event::default()
                        .event("complete")
                        .data(serde_json::to_string(&final_event).unwrap_or_default()));
                    break;
                }
                Some(_) => {}
                None => break,
            }

            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    };

    Ok(Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(1))
            .text("keep-alive"),
    ))
}
