//! Monitor statistics endpoint

use axum::{Json, extract::State};

use crate::{api::state::ApiState, state::MonitorStats};

/// GET /api/v1/stats
///
/// Returns tick and hiccup counters plus history fill level
pub async fn get_stats(State(state): State<ApiState>) -> Json<MonitorStats> {
    Json(state.monitor.stats().await)
}
