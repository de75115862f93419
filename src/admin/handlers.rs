use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::actions::{ActionEntry, LogSnapshot};
use crate::admin::AdminState;
use crate::dashboard::{AutoPingStatus, DashboardSnapshot};
use crate::verification::CycleError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct AutoPingRequest {
    pub rate_per_sec: f64,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<DashboardSnapshot> {
    Json(state.dashboard.snapshot())
}

pub async fn get_log(State(state): State<AdminState>) -> Json<LogSnapshot> {
    Json(state.dashboard.log_snapshot())
}

pub async fn clear_log(State(state): State<AdminState>) -> StatusCode {
    state.dashboard.clear_log();
    StatusCode::NO_CONTENT
}

pub async fn fetch_data(State(state): State<AdminState>) -> Json<ActionEntry> {
    Json(state.dashboard.fetch_data().await)
}

pub async fn inject_fault(State(state): State<AdminState>) -> Json<ActionEntry> {
    let path = state.dashboard.config().failure_cycle.fail_path.clone();
    Json(state.dashboard.post_action(&path).await)
}

pub async fn recover(State(state): State<AdminState>) -> Json<ActionEntry> {
    Json(state.dashboard.post_action("/recover").await)
}

pub async fn run_cycle(State(state): State<AdminState>) -> Response {
    match state.dashboard.run_failure_cycle().await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            let (status, kind) = match e {
                CycleError::Trigger(_) => (StatusCode::BAD_GATEWAY, "trigger"),
                CycleError::RecoveryTimeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "recovery_timeout"),
            };
            let body = ErrorBody {
                error: e.to_string(),
                kind,
            };
            (status, Json(body)).into_response()
        }
    }
}

pub async fn start_auto_ping(
    State(state): State<AdminState>,
    Json(req): Json<AutoPingRequest>,
) -> Response {
    match state.dashboard.start_auto_ping(req.rate_per_sec) {
        Ok(_) => Json(state.dashboard.snapshot().auto_ping).into_response(),
        Err(e) => {
            let body = ErrorBody {
                error: e.to_string(),
                kind: "invalid_rate",
            };
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
    }
}

pub async fn stop_auto_ping(State(state): State<AdminState>) -> Json<AutoPingStatus> {
    state.dashboard.stop_auto_ping();
    Json(state.dashboard.snapshot().auto_ping)
}
