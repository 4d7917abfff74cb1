//! REST API handlers for the timer service
//!
//! | Method | Path            | Success                 |
//! |--------|-----------------|-------------------------|
//! | POST   | `/timers`       | 201, created timer      |
//! | GET    | `/timers`       | 200, array of timers    |
//! | PUT    | `/timers/{id}`  | 200, updated timer      |
//! | GET    | `/health`       | 200, service status     |
//! | GET    | `/metrics`      | 200, Prometheus text    |

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;

use crate::error::{Result, TimerError};
use crate::metrics;

use super::server::AppState;

// ============================================================================
// API Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Error body returned for every failed timer request
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
            code: code.into(),
        }
    }
}

impl From<&TimerError> for ErrorResponse {
    fn from(err: &TimerError) -> Self {
        Self::new(err.to_string(), err.code())
    }
}

impl IntoResponse for TimerError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorResponse::from(&self))).into_response()
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub storage: String,
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/timers", get(list_timers).post(create_timer))
        .route("/timers/{id}", put(replace_timer));

    if state.config.enable_metrics {
        router = router.route("/metrics", get(metrics_endpoint));
    }

    router.with_state(state)
}

/// Turn an operation result into a response and record it
fn respond<T: Serialize>(
    operation: &'static str,
    started: Instant,
    success: StatusCode,
    result: Result<T>,
) -> Response {
    let response = match result {
        Ok(body) => (success, Json(body)).into_response(),
        Err(err) => {
            tracing::debug!(operation, code = err.code(), error = %err, "Timer request rejected");
            err.into_response()
        }
    };

    metrics::record_api_request(
        operation,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}

// ============================================================================
// Timer Handlers
// ============================================================================

/// Create a timer
async fn create_timer(State(state): State<AppState>, body: Bytes) -> Response {
    let started = Instant::now();
    let result = state.controller.create(&body).await;
    respond("create", started, StatusCode::CREATED, result)
}

/// List all timers
async fn list_timers(State(state): State<AppState>) -> Response {
    let started = Instant::now();
    let result = state.controller.list().await;
    respond("list", started, StatusCode::OK, result)
}

/// Replace an existing timer
async fn replace_timer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let started = Instant::now();
    let result = state.controller.replace(&id, &body).await;
    respond("replace", started, StatusCode::OK, result)
}

// ============================================================================
// Service Handlers
// ============================================================================

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        storage: state.controller.backend_name().to_string(),
    }))
}

/// Prometheus scrape endpoint
async fn metrics_endpoint() -> Response {
    match metrics::encode_metrics() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to encode metrics", "metrics_failure")),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
