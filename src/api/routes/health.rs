//! Liveness of the daemon itself

use axum::{Json, extract::State};

use crate::api::{state::ApiState, types::HealthResponse};

/// GET /api/v1/health
///
/// Reports whether the scheduler has completed a tick yet, independent of
/// the target's health.
pub async fn health_check(State(state): State<ApiState>) -> Json<HealthResponse> {
    let stats = state.monitor.stats().await;
    let status = if stats.ticks == 0 { "initializing" } else { "ok" };

    Json(HealthResponse {
        status: status.to_string(),
        target: state.monitor.target().to_string(),
        ticks: stats.ticks,
        last_tick: stats.last_tick,
        uptime_secs: stats.uptime_secs,
    })
}
