//! ProbeSchedulerActor - drives the probe pipeline
//!
//! ## Message Flow
//!
//! ```text
//! Timer tick → Probe target → Evaluate → Apply to SharedState → Publish TickEvent
//!     ↑
//!     └─── Commands (ProbeNow, Shutdown)
//! ```
//!
//! The first tick fires immediately after spawning. Ticks never overlap: the
//! probe is awaited inside the loop, and ticks missed while a slow probe is
//! running are delayed instead of being fired in a burst.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use futures::FutureExt;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::{
    HealthSnapshot,
    config::{Config, ProbeConfig, Thresholds},
    monitors::{ProbeError, ProbeOutcome, Prober, evaluate},
    state::SharedState,
};

use super::messages::{SchedulerCommand, TickEvent};

/// Actor that probes the configured target forever
pub struct ProbeSchedulerActor {
    target: String,

    /// Policy handed to the prober
    probe: ProbeConfig,

    thresholds: Thresholds,

    interval_duration: Duration,

    prober: Arc<dyn Prober>,

    /// Write side of the shared state
    state: SharedState,

    command_rx: mpsc::Receiver<SchedulerCommand>,

    /// Broadcast sender for tick events
    event_tx: broadcast::Sender<TickEvent>,
}

impl ProbeSchedulerActor {
    pub fn new(
        config: &Config,
        prober: Arc<dyn Prober>,
        state: SharedState,
        command_rx: mpsc::Receiver<SchedulerCommand>,
        event_tx: broadcast::Sender<TickEvent>,
    ) -> Self {
        Self {
            target: config.target.clone(),
            probe: config.probe,
            thresholds: config.thresholds,
            interval_duration: config.interval().max(Duration::from_millis(1)),
            prober,
            state,
            command_rx,
            event_tx,
        }
    }

    /// Run the actor's main loop
    ///
    /// Runs until a Shutdown command is received or every handle is dropped.
    #[instrument(skip(self), fields(target = %self.target))]
    pub async fn run(mut self) {
        debug!(
            "starting probe scheduler with interval {:?}",
            self.interval_duration
        );

        let mut ticker = interval(self.interval_duration);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(SchedulerCommand::ProbeNow { respond_to }) => {
                            debug!("received ProbeNow command");
                            let snapshot = self.tick().await;
                            let _ = respond_to.send(snapshot);
                        }

                        Some(SchedulerCommand::Shutdown) => {
                            debug!("received shutdown command");
                            break;
                        }

                        None => {
                            warn!("command channel closed, shutting down");
                            break;
                        }
                    }
                }
            }
        }

        debug!("probe scheduler stopped");
    }

    /// Run one full cycle: probe, evaluate, update state, publish.
    async fn tick(&self) -> HealthSnapshot {
        let timestamp = Utc::now();

        let outcome = self.probe_target().await;
        if let Err(e) = &outcome {
            error!("error pinging {}: {e}", self.target);
        }

        let evaluation = evaluate(&outcome, &self.thresholds, timestamp);
        self.state.apply(&evaluation).await;

        let snapshot = &evaluation.snapshot;
        trace!(
            "status: {} ({}), latency: {:?}ms, loss: {:?}%, jitter: {:?}ms",
            snapshot.status,
            snapshot.overall,
            snapshot.avg_latency_ms,
            snapshot.packet_loss,
            snapshot.jitter_ms
        );

        // no subscribers is fine
        let _ = self.event_tx.send(TickEvent {
            target: self.target.clone(),
            snapshot: snapshot.clone(),
            hiccup: evaluation.hiccup.clone(),
        });

        evaluation.snapshot
    }

    /// Call the prober, turning a panic into a probe error.
    async fn probe_target(&self) -> ProbeOutcome {
        AssertUnwindSafe(self.prober.probe(&self.target, &self.probe))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(ProbeError::Panicked(panic_message(panic.as_ref()))))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        String::from("unknown panic")
    }
}

/// Handle for controlling a ProbeSchedulerActor
///
/// The scheduler is running from the moment [`SchedulerHandle::spawn`] returns.
#[derive(Clone)]
pub struct SchedulerHandle {
    sender: mpsc::Sender<SchedulerCommand>,
    target: String,
}

impl SchedulerHandle {
    /// Spawn the scheduler actor on the current tokio runtime
    pub fn spawn(
        config: &Config,
        prober: Arc<dyn Prober>,
        state: SharedState,
        event_tx: broadcast::Sender<TickEvent>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        let actor = ProbeSchedulerActor::new(config, prober, state, cmd_rx, event_tx);
        info!(
            "monitoring {} every {}ms",
            config.target, config.interval_ms
        );

        tokio::spawn(actor.run());

        Self {
            sender: cmd_tx,
            target: config.target.clone(),
        }
    }

    /// Run a tick immediately and return the resulting snapshot
    pub async fn probe_now(&self) -> Result<HealthSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(SchedulerCommand::ProbeNow { respond_to: tx })
            .await
            .context("failed to send ProbeNow command")?;

        rx.await.context("failed to receive response")
    }

    /// Stop the scheduler
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(SchedulerCommand::Shutdown)
            .await
            .context("failed to send Shutdown command")?;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}
