//! Message types for actor communication
//!
//! 1. **Commands**: Request/response messages sent to the scheduler via mpsc
//! 2. **Events**: Broadcast notifications published after every tick

use tokio::sync::oneshot;

use crate::{HealthSnapshot, HiccupRecord};

/// Event published after every completed tick
///
/// Slow subscribers may lag and miss events; the shared state always holds
/// the authoritative data.
#[derive(Debug, Clone)]
pub struct TickEvent {
    /// Probed target
    pub target: String,

    /// Snapshot that became current with this tick
    pub snapshot: HealthSnapshot,

    /// Hiccup recorded by this tick, if any
    pub hiccup: Option<HiccupRecord>,
}

/// Commands that can be sent to the ProbeSchedulerActor
#[derive(Debug)]
pub enum SchedulerCommand {
    /// Run a full tick right away (bypassing the interval timer)
    ProbeNow {
        /// Channel to send the resulting snapshot back
        respond_to: oneshot::Sender<HealthSnapshot>,
    },

    /// Stop the scheduler after the current tick
    Shutdown,
}
