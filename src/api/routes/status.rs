//! Current status, history and hiccup endpoints

use axum::{Json, extract::State};

use crate::{
    api::{
        state::ApiState,
        types::{HiccupsResponse, HistoryResponse, StatusResponse},
    },
    state::StatusSnapshot,
};

/// GET /api/v1/status
pub async fn get_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        target: state.monitor.target().to_string(),
        started_at: state.monitor.started_at(),
        current: state.monitor.current().await,
    })
}

/// GET /api/v1/history
///
/// Entries are ordered oldest to newest
pub async fn get_history(State(state): State<ApiState>) -> Json<HistoryResponse> {
    let entries = state.monitor.history().await;

    Json(HistoryResponse {
        count: entries.len(),
        entries,
    })
}

/// GET /api/v1/hiccups
///
/// Records are ordered oldest to newest
pub async fn get_hiccups(State(state): State<ApiState>) -> Json<HiccupsResponse> {
    let hiccups = state.monitor.hiccups().await;

    Json(HiccupsResponse {
        count: hiccups.len(),
        hiccups,
    })
}

/// GET /api/v1/snapshot
///
/// Status, history and hiccups taken under a single read lock
pub async fn get_snapshot(State(state): State<ApiState>) -> Json<StatusSnapshot> {
    Json(state.monitor.snapshot().await)
}
