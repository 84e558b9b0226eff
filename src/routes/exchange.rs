use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use http::StatusCode;
use serde_json::json;

use crate::fetch_service::FetchReport;
use crate::models::{AppState, CreateExchange};
use crate::scheduler::Trigger;
use crate::storage::DEFAULT_LIST_LIMIT;
use crate::Result;

pub fn init(state: AppState) -> Router {
    Router::new()
        .route("/api/exchange", get(list).post(create))
        .route("/api/exchange/fetch", post(force_fetch))
        .route("/run-job", post(run_job))
        .with_state(state)
}

/// Most recent stored records, newest first.
async fn list(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let data = state.storage.list_recent(DEFAULT_LIST_LIMIT).await?;
    Ok(Json(json!({ "status": "ok", "data": data })))
}

/// Inserts a caller-supplied record. Validation runs before any storage call.
async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateExchange>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let id = state.storage.insert_one(&payload.into_record()).await?;
    Ok((StatusCode::CREATED, Json(json!({ "status": "ok", "id": id }))))
}

/// Runs the fetch pipeline synchronously and returns its report.
async fn force_fetch(State(state): State<AppState>) -> impl IntoResponse {
    report_response(state.scheduler.run_once(Trigger::Fetch).await)
}

/// Same pipeline, exposed as the job-runner entry point.
async fn run_job(State(state): State<AppState>) -> impl IntoResponse {
    report_response(state.scheduler.run_once(Trigger::Job).await)
}

fn report_response(report: FetchReport) -> impl IntoResponse {
    let code = if report.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    (code, Json(report))
}
