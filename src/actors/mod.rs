//! Actor-based monitoring pipeline
//!
//! ```text
//!   SchedulerHandle ── commands (mpsc) ──► ProbeSchedulerActor
//!                                                │
//!                                   probe → evaluate (one tick)
//!                                                │
//!                              ┌─────────────────┴─────────────────┐
//!                              ▼                                   ▼
//!                   SharedState (one write / tick)     Broadcast Channel (TickEvent)
//!                              │                                   │
//!                              ▼ read                              ▼
//!                           Read API                        StatusLogActor
//! ```
//!
//! ## Communication Patterns
//!
//! 1. **Commands**: the scheduler has an mpsc command channel for control messages
//! 2. **Events**: every tick is published to a broadcast channel for fan-out
//! 3. **Request/Response**: oneshot channels for synchronous queries

pub mod messages;
pub mod scheduler;
pub mod status_log;
