pub mod actors;
pub mod api;
pub mod config;
pub mod monitors;
pub mod state;
pub mod storage;
pub mod util;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw outcome of a single probe against the target
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProbeResult {
    pub is_alive: bool,
    pub avg_latency_ms: Option<f64>,
    pub min_latency_ms: Option<f64>,
    pub max_latency_ms: Option<f64>,
    /// Packet loss in percent, if the probe reported it
    pub packet_loss: Option<f64>,
}

impl ProbeResult {
    pub fn unreachable() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Warn,
    Error,
    Initializing,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Ok => "ok",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::Initializing => "initializing",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified view of the most recent tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub timestamp: Option<DateTime<Utc>>,
    pub avg_latency_ms: Option<f64>,
    pub min_latency_ms: Option<f64>,
    pub max_latency_ms: Option<f64>,
    pub packet_loss: Option<f64>,
    pub jitter_ms: Option<f64>,
    pub is_alive: bool,
    pub overall: Severity,
    pub status: String,
    /// `None` if the dimension was not evaluated
    pub latency: Option<Severity>,
    pub loss: Option<Severity>,
    pub jitter: Option<Severity>,
}

impl HealthSnapshot {
    /// Snapshot shown before the first tick has completed
    pub fn initializing() -> Self {
        Self {
            timestamp: None,
            avg_latency_ms: None,
            min_latency_ms: None,
            max_latency_ms: None,
            packet_loss: None,
            jitter_ms: None,
            is_alive: false,
            overall: Severity::Initializing,
            status: String::from("Initializing..."),
            latency: None,
            loss: None,
            jitter: None,
        }
    }
}

/// Measurement kept in the history ring buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub avg_latency_ms: Option<f64>,
    pub min_latency_ms: Option<f64>,
    pub max_latency_ms: Option<f64>,
    pub packet_loss: Option<f64>,
    pub jitter_ms: Option<f64>,
    pub is_alive: bool,
}

impl HistoryEntry {
    pub fn from_snapshot(timestamp: DateTime<Utc>, snapshot: &HealthSnapshot) -> Self {
        Self {
            timestamp,
            avg_latency_ms: snapshot.avg_latency_ms,
            min_latency_ms: snapshot.min_latency_ms,
            max_latency_ms: snapshot.max_latency_ms,
            packet_loss: snapshot.packet_loss,
            jitter_ms: snapshot.jitter_ms,
            is_alive: snapshot.is_alive,
        }
    }
}

/// A detected anomaly ("hiccup")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiccupRecord {
    pub timestamp: DateTime<Utc>,
    /// Every triggering condition, comma separated, in detection order
    pub reason: String,
    pub latency_ms: Option<f64>,
    pub packet_loss: Option<f64>,
}
