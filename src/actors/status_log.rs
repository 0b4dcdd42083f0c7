//! StatusLogActor - operator log of the tick stream
//!
//! Subscribes to [`TickEvent`]s and writes hiccups and changes of the overall
//! severity to the log. Healthy ticks that do not change anything stay at
//! trace level.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, trace, warn};

use crate::Severity;

use super::messages::TickEvent;

pub struct StatusLogActor {
    event_rx: broadcast::Receiver<TickEvent>,

    /// Overall severity of the last observed tick
    last: Severity,
}

impl StatusLogActor {
    pub fn new(event_rx: broadcast::Receiver<TickEvent>) -> Self {
        Self {
            event_rx,
            last: Severity::Initializing,
        }
    }

    /// Run until the scheduler drops its sender
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        debug!("starting status log");

        loop {
            match self.event_rx.recv().await {
                Ok(event) => self.log(&event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("status log lagged, skipped {skipped} ticks");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("tick channel closed, stopping status log");
                    break;
                }
            }
        }
    }

    fn log(&mut self, event: &TickEvent) {
        if let Some(hiccup) = &event.hiccup {
            warn!(
                "hiccup detected on {}: {} (latency: {:?}ms, loss: {:?}%)",
                event.target, hiccup.reason, hiccup.latency_ms, hiccup.packet_loss
            );
        }

        match self.observe(event) {
            Some(previous) => info!(
                "{} changed from {} to {}: {}",
                event.target, previous, event.snapshot.overall, event.snapshot.status
            ),
            None => trace!("{} still {}", event.target, event.snapshot.status),
        }
    }

    /// Record the tick's severity, returning the previous one if it changed.
    fn observe(&mut self, event: &TickEvent) -> Option<Severity> {
        let current = event.snapshot.overall;
        if current == self.last {
            return None;
        }

        Some(std::mem::replace(&mut self.last, current))
    }
}

/// Spawn a [`StatusLogActor`] on the current tokio runtime
pub fn spawn_status_log(event_rx: broadcast::Receiver<TickEvent>) -> JoinHandle<()> {
    tokio::spawn(StatusLogActor::new(event_rx).run())
}
