//! Router configuration for the HTTP API.
//!
//! Sets up all routes and middleware (CORS, compression, tracing).

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Date inputs
        .route("/users/{user}/dates", get(handlers::list_dates))
        .route(
            "/users/{user}/dates/{date}",
            axum::routing::delete(handlers::delete_date),
        )
        .route("/users/{user}/dates/{date}/matrix", put(handlers::put_matrix))
        .route("/users/{user}/dates/{date}/hours", put(handlers::put_hours))
        .route("/users/{user}/dates/{date}/check", get(handlers::check_date))
        .route("/users/{user}/sequence/{target}", get(handlers::get_sequence))
        // Settings
        .route(
            "/users/{user}/settings",
            get(handlers::get_settings).put(handlers::put_settings),
        )
        // Analysis
        .route("/users/{user}/window/{date}", get(handlers::get_window))
        .route("/users/{user}/analysis/{date}", get(handlers::get_analysis))
        .route(
            "/users/{user}/analysis/{date}/status",
            get(handlers::get_analysis_status),
        )
        .route("/users/{user}/batch", post(handlers::start_batch))
        // Job management
        .route("/jobs/{job_id}", get(handlers::get_job_status))
        .route("/jobs/{job_id}/logs", get(handlers::stream_job_logs));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        // Full 30-topic matrices can be large.
        .layer(DefaultBodyLimit::max(16 * 1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let repo =
            Arc::new(LocalRepository::new()) as Arc<dyn crate::db::repository::FullRepository>;
        let _router = create_router(AppState::new(repo));
    }
}
