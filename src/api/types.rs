//! API response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{HealthSnapshot, HiccupRecord, HistoryEntry};

/// Response for GET /api/v1/health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"initializing"` until the first tick completed, `"ok"` afterwards
    pub status: String,
    pub target: String,
    pub ticks: u64,
    pub last_tick: Option<DateTime<Utc>>,
    pub uptime_secs: i64,
}

/// Response for GET /api/v1/status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub current: HealthSnapshot,
}

/// Response for GET /api/v1/history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub entries: Vec<HistoryEntry>,
    pub count: usize,
}

/// Response for GET /api/v1/hiccups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HiccupsResponse {
    pub hiccups: Vec<HiccupRecord>,
    pub count: usize,
}
