//! HTTP handler for the Dependency Health Agent
//!
//! Serves health reports to the dashboard and Prometheus metrics.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::contracts::*;
use crate::engine::DependencyHealthEngine;
use crate::error::HealthReportError;
use crate::telemetry::{self, ReportMetrics};

/// Metric label for requests that resolve to no single configured instance
pub const UNRESOLVED_INSTANCE: &str = "unknown";

/// Application state
pub struct AppState {
    pub engine: DependencyHealthEngine,
    pub metrics: ReportMetrics,
}

impl AppState {
    pub fn new(engine: DependencyHealthEngine) -> telemetry::Result<Self> {
        Ok(Self {
            engine,
            metrics: ReportMetrics::new()?,
        })
    }
}

/// Create the router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/api/HealthCheck", get(report_by_query))
        .route("/api/v1/instances/:instance/health", get(report_by_path))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness endpoint
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        agent_id: crate::AGENT_ID.to_string(),
        agent_version: crate::AGENT_VERSION.to_string(),
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                e.to_string(),
            )
        }
    }
}

/// Report for `?instanceName=`
async fn report_by_query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportParams>,
) -> Result<Json<HealthReport>, (StatusCode, Json<ApiError>)> {
    match params.instance_name.filter(|name| !name.trim().is_empty()) {
        Some(name) => build_report(&state, &name).await,
        None => Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "InvalidInput".to_string(),
                message: "instanceName query parameter is required".to_string(),
                request_id: None,
            }),
        )),
    }
}

async fn report_by_path(
    State(state): State<Arc<AppState>>,
    Path(instance): Path<String>,
) -> Result<Json<HealthReport>, (StatusCode, Json<ApiError>)> {
    build_report(&state, &instance).await
}

async fn build_report(
    state: &AppState,
    instance: &str,
) -> Result<Json<HealthReport>, (StatusCode, Json<ApiError>)> {
    let request_id = Uuid::new_v4();
    let start = Instant::now();

    match state.engine.report(instance).await {
        Ok(report) => {
            state
                .metrics
                .record_report(&report, start.elapsed().as_secs_f64());
            Ok(Json(report))
        }
        Err(e) => {
            tracing::warn!(%request_id, instance, error = %e, "Health report failed");

            // Label by configured name only; raw request names never reach metrics
            let label = state
                .engine
                .catalog()
                .resolve(instance)
                .map(|resolved| resolved.name.as_str())
                .unwrap_or(UNRESOLVED_INSTANCE);
            state
                .metrics
                .record_failure(label, &e, start.elapsed().as_secs_f64());

            Err((
                status_for(&e),
                Json(ApiError {
                    error: e.kind().to_string(),
                    message: e.to_string(),
                    request_id: Some(request_id),
                }),
            ))
        }
    }
}

/// HTTP status for a failed report
pub fn status_for(error: &HealthReportError) -> StatusCode {
    match error {
        HealthReportError::UnknownInstance(_) => StatusCode::NOT_FOUND,
        HealthReportError::AmbiguousInstance { .. } => StatusCode::CONFLICT,
        HealthReportError::Parse(_) | HealthReportError::Query(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Report query parameters
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportParams {
    pub instance_name: Option<String>,
}

/// Health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub agent_id: String,
    pub agent_version: String,
}

/// API error
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    pub request_id: Option<Uuid>,
}
