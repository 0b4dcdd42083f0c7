//! Shared monitor state
//!
//! The current snapshot, the history and the hiccup log live together behind a
//! single lock. Each tick applies its whole update under one write guard, so
//! readers either see the complete previous tick or the complete new one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::{
    HealthSnapshot, HiccupRecord, HistoryEntry,
    config::Config,
    monitors::Evaluation,
    storage::{HiccupLog, HistoryBuffer},
};

#[derive(Debug)]
struct MonitorState {
    current: HealthSnapshot,
    history: HistoryBuffer,
    hiccups: HiccupLog,
    ticks: u64,
}

/// Consistent copy of everything the read side may look at
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub current: HealthSnapshot,
    pub history: Vec<HistoryEntry>,
    pub hiccups: Vec<HiccupRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonitorStats {
    pub ticks: u64,
    /// Timestamp of the most recent tick, `None` before the first one
    pub last_tick: Option<DateTime<Utc>>,
    pub hiccups_total: u64,
    pub hiccups_stored: usize,
    pub history_length: usize,
    pub history_capacity: usize,
    pub uptime_secs: i64,
}

/// Cloneable handle to the monitor state
///
/// Only [`SharedState::apply`] mutates; everything else hands out copies.
#[derive(Debug, Clone)]
pub struct SharedState {
    inner: Arc<RwLock<MonitorState>>,
    target: Arc<str>,
    started_at: DateTime<Utc>,
}

impl SharedState {
    pub fn new(target: &str, history_length: usize, max_hiccups: Option<usize>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(MonitorState {
                current: HealthSnapshot::initializing(),
                history: HistoryBuffer::new(history_length),
                hiccups: HiccupLog::with_cap(max_hiccups),
                ticks: 0,
            })),
            target: Arc::from(target),
            started_at: Utc::now(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.target, config.history_length, config.max_hiccups)
    }

    /// Apply the result of one tick.
    pub async fn apply(&self, evaluation: &Evaluation) {
        let mut state = self.inner.write().await;

        if let Some(timestamp) = evaluation.snapshot.timestamp {
            state
                .history
                .push(HistoryEntry::from_snapshot(timestamp, &evaluation.snapshot));
        }
        if let Some(hiccup) = &evaluation.hiccup {
            state.hiccups.push(hiccup.clone());
        }
        state.current = evaluation.snapshot.clone();
        state.ticks += 1;
    }

    pub async fn current(&self) -> HealthSnapshot {
        self.inner.read().await.current.clone()
    }

    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.inner.read().await.history.snapshot()
    }

    pub async fn hiccups(&self) -> Vec<HiccupRecord> {
        self.inner.read().await.hiccups.snapshot()
    }

    pub async fn snapshot(&self) -> StatusSnapshot {
        let state = self.inner.read().await;
        StatusSnapshot {
            target: self.target.to_string(),
            started_at: self.started_at,
            current: state.current.clone(),
            history: state.history.snapshot(),
            hiccups: state.hiccups.snapshot(),
        }
    }

    pub async fn stats(&self) -> MonitorStats {
        let state = self.inner.read().await;
        MonitorStats {
            ticks: state.ticks,
            last_tick: state.current.timestamp,
            hiccups_total: state.hiccups.total(),
            hiccups_stored: state.hiccups.len(),
            history_length: state.history.len(),
            history_capacity: state.history.capacity(),
            uptime_secs: (Utc::now() - self.started_at).num_seconds(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}
