//! HTTP API for the Catering Engine.
//!
//! This module exposes a small REST API around the allocation engine
//! using the [`axum`](https://crates.io/crates/axum) framework.  Clients
//! post an event configuration and receive the breakdown as JSON, run a
//! break-even sweep, and save named report snapshots for later viewing.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::breakeven::{sweep, BreakEvenPoint, SweepError};
use crate::engine::{evaluate, evaluate_batch};
use crate::models::{EventFinancialInput, EventFinancialOutput};
use crate::snapshot::{
    self, summarize, FinancialSummary, ReportRecord, SnapshotError, SnapshotResult, SnapshotStore,
};
use crate::validation::{validate, ValidationError};

/// Application state shared across requests.
pub struct AppState {
    pub store: Arc<dyn SnapshotStore>,
}

#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    Sweep(SweepError),
    Snapshot(SnapshotError),
    /// A blocking store task panicked or was cancelled.
    Task(tokio::task::JoinError),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<SweepError> for ApiError {
    fn from(err: SweepError) -> Self {
        ApiError::Sweep(err)
    }
}

impl From<SnapshotError> for ApiError {
    fn from(err: SnapshotError) -> Self {
        ApiError::Snapshot(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({"error": err.to_string(), "field": err.field()}),
            ),
            ApiError::Sweep(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({"error": err.to_string()}),
            ),
            ApiError::Snapshot(SnapshotError::Invalid(err)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({"error": err.to_string(), "field": err.field()}),
            ),
            ApiError::Snapshot(err) => {
                let status = match &err {
                    SnapshotError::NotFound(_) => StatusCode::NOT_FOUND,
                    SnapshotError::AlreadyExists(_) => StatusCode::CONFLICT,
                    SnapshotError::InvalidName => StatusCode::UNPROCESSABLE_ENTITY,
                    _ => {
                        tracing::error!("report store failed: {err}");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, json!({"error": err.to_string()}))
            }
            ApiError::Task(err) => {
                tracing::error!("report store task failed: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "report store task failed"}),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Run a store operation on the blocking pool; stores may do file I/O.
async fn with_store<T, F>(app_state: &AppState, op: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn SnapshotStore) -> SnapshotResult<T> + Send + 'static,
{
    let store = Arc::clone(&app_state.store);
    let result = tokio::task::spawn_blocking(move || op(store.as_ref()))
        .await
        .map_err(ApiError::Task)?;
    Ok(result?)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepRequest {
    pub input: EventFinancialInput,
    pub from: u32,
    pub to: u32,
    #[serde(default = "default_step")]
    pub step: u32,
}

fn default_step() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct NewReport {
    pub name: String,
    pub input: EventFinancialInput,
}

/// Build the API router on top of `store`.
pub fn build_router(store: Arc<dyn SnapshotStore>) -> Router {
    let state = Arc::new(AppState { store });
    Router::new()
        .route("/api/calculate", post(calculate_handler))
        .route("/api/calculate/batch", post(calculate_batch_handler))
        .route("/api/breakeven", post(breakeven_handler))
        .route("/api/reports", post(create_report_handler).get(list_reports_handler))
        .route(
            "/api/reports/:name",
            get(get_report_handler).delete(delete_report_handler),
        )
        .route("/api/summary", get(summary_handler))
        .with_state(state)
}

/// Handler for POST /api/calculate
async fn calculate_handler(
    Json(input): Json<EventFinancialInput>,
) -> ApiResult<Json<EventFinancialOutput>> {
    let output = evaluate(&input).inspect_err(|err| tracing::debug!("rejected input: {err}"))?;
    Ok(Json(output))
}

async fn calculate_batch_handler(
    Json(inputs): Json<Vec<EventFinancialInput>>,
) -> ApiResult<Json<Vec<EventFinancialOutput>>> {
    let outputs = evaluate_batch(&inputs)?;
    tracing::debug!("computed batch of {} event(s)", outputs.len());
    Ok(Json(outputs))
}

async fn breakeven_handler(
    Json(request): Json<SweepRequest>,
) -> ApiResult<Json<Vec<BreakEvenPoint>>> {
    validate(&request.input)?;
    let points = sweep(&request.input, request.from, request.to, request.step)?;
    Ok(Json(points))
}

/// Handler for POST /api/reports: compute, snapshot and store.
async fn create_report_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<NewReport>,
) -> ApiResult<(StatusCode, Json<ReportRecord>)> {
    let output = evaluate(&request.input)?;
    let record = snapshot::serialize(request.input, output, request.name.trim());
    let stored = record.clone();
    with_store(&app_state, move |store| store.save(stored)).await?;
    tracing::info!("saved report {:?}", record.name);
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_reports_handler(
    State(app_state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ReportRecord>>> {
    let reports = with_store(&app_state, |store| store.list()).await?;
    Ok(Json(reports))
}

async fn get_report_handler(
    State(app_state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<ReportRecord>> {
    let report = with_store(&app_state, move |store| store.load(&name)).await?;
    Ok(Json(report))
}

async fn delete_report_handler(
    State(app_state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    let deleted = name.clone();
    with_store(&app_state, move |store| store.delete(&deleted)).await?;
    tracing::info!("deleted report {name:?}");
    Ok(StatusCode::NO_CONTENT)
}

async fn summary_handler(
    State(app_state): State<Arc<AppState>>,
) -> ApiResult<Json<FinancialSummary>> {
    let reports = with_store(&app_state, |store| store.list()).await?;
    Ok(Json(summarize(&reports)))
}

/// Launch the API server on `addr`.  Runs until the server terminates
/// (e.g. when interrupted).
pub async fn serve(addr: &str, store: Arc<dyn SnapshotStore>) -> Result<()> {
    let router = build_router(store);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);
    axum::serve(listener, router).await?;
    Ok(())
}
