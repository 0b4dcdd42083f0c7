//! API shared state

use crate::state::SharedState;

/// Shared state passed to all API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Read side of the monitor state
    pub monitor: SharedState,
}

impl ApiState {
    pub fn new(monitor: SharedState) -> Self {
        Self { monitor }
    }
}
