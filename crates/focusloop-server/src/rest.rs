//! `/api` route handlers.
//!
//! Every failure is answered with `{"error": "<message>"}` and a 4xx/5xx
//! status; successful calls return the bare record or list.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use focusloop_core::error::CoreError;
use focusloop_core::{stats, NewSession, SessionRecord, SessionStore};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::ServerState;

const INVALID_SESSION: &str = "Invalid session data";
const FETCH_FAILED: &str = "Failed to fetch sessions";

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/health", get(health))
        .route("/sessions", post(create_session))
        .route("/sessions/today", get(sessions_today))
        .route("/sessions/week", get(sessions_week))
        .route("/sessions/month", get(sessions_month))
        .route("/sessions/range", get(sessions_range))
        .route("/stats/insights", get(insights))
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn create_session(
    State(state): State<ServerState>,
    payload: Result<Json<NewSession>, JsonRejection>,
) -> Response {
    let session = match payload {
        Ok(Json(session)) => session,
        Err(rejection) => {
            warn!("rejected session payload: {rejection}");
            return error_response(StatusCode::BAD_REQUEST, INVALID_SESSION);
        }
    };

    match state.with_store(|store| store.create_session(session)) {
        Ok(record) => {
            info!(id = %record.id, session_type = record.session_type.label(), "session recorded");
            (StatusCode::OK, Json(record)).into_response()
        }
        Err(CoreError::Validation(e)) => {
            warn!("rejected session payload: {e}");
            error_response(StatusCode::BAD_REQUEST, INVALID_SESSION)
        }
        Err(e) => {
            error!("failed to save session: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save session")
        }
    }
}

/// Shared tail of every read route.
fn respond_with_sessions(
    state: &ServerState,
    window: &str,
    query: impl FnOnce(&dyn SessionStore) -> focusloop_core::error::Result<Vec<SessionRecord>>,
) -> Response {
    match state.with_store(|store| query(&*store)) {
        Ok(records) => {
            info!(window, count = records.len(), "sessions fetched");
            Json(records).into_response()
        }
        Err(e) => {
            error!(window, "failed to fetch sessions: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, FETCH_FAILED)
        }
    }
}

async fn sessions_today(State(state): State<ServerState>) -> Response {
    let today = state.clock().today();
    respond_with_sessions(&state, "today", |store| store.sessions_by_date(today))
}

async fn sessions_week(State(state): State<ServerState>) -> Response {
    let today = state.clock().today();
    respond_with_sessions(&state, "week", |store| store.sessions_this_week(today))
}

async fn sessions_month(State(state): State<ServerState>) -> Response {
    let today = state.clock().today();
    respond_with_sessions(&state, "month", |store| store.sessions_last_30_days(today))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RangeParams {
    start_date: Option<String>,
    end_date: Option<String>,
}

fn parse_day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

async fn sessions_range(
    State(state): State<ServerState>,
    params: Result<Query<RangeParams>, QueryRejection>,
) -> Response {
    let (start, end) = match params {
        Ok(Query(RangeParams {
            start_date: Some(start),
            end_date: Some(end),
        })) => (start, end),
        Ok(_) => {
            return error_response(StatusCode::BAD_REQUEST, "startDate and endDate are required");
        }
        Err(rejection) => {
            warn!("rejected range query: {rejection}");
            return error_response(StatusCode::BAD_REQUEST, "startDate and endDate are required");
        }
    };

    let (Some(start), Some(end)) = (parse_day(&start), parse_day(&end)) else {
        warn!(start = %start, end = %end, "unparseable range bounds");
        return error_response(
            StatusCode::BAD_REQUEST,
            "startDate and endDate must be YYYY-MM-DD dates",
        );
    };

    respond_with_sessions(&state, "range", |store| store.sessions_by_date_range(start, end))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsightsParams {
    daily_goal: Option<u32>,
}

async fn insights(
    State(state): State<ServerState>,
    params: Result<Query<InsightsParams>, QueryRejection>,
) -> Response {
    let daily_goal = match params {
        Ok(Query(InsightsParams { daily_goal })) => daily_goal.unwrap_or(state.daily_goal()),
        Err(rejection) => {
            warn!("rejected insights query: {rejection}");
            return error_response(StatusCode::BAD_REQUEST, "dailyGoal must be a whole number");
        }
    };

    let today = state.clock().today();
    match state.with_store(|store| store.sessions_last_30_days(today)) {
        Ok(records) => Json(stats::insights(&records, today, daily_goal)).into_response(),
        Err(e) => {
            error!("failed to compute insights: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, FETCH_FAILED)
        }
    }
}
