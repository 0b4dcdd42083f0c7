//! End-to-end tests of the tick pipeline: prober → evaluation → shared state
//! → tick events

use std::sync::Arc;
use std::time::Duration;

use hiccup_monitor::{
    ProbeResult, Severity,
    actors::scheduler::SchedulerHandle,
    config::Config,
    state::SharedState,
};
use pretty_assertions::assert_eq;
use tokio::sync::broadcast;

use crate::helpers::*;

#[tokio::test]
async fn test_first_tick_runs_immediately() {
    let config = test_config();
    let state = SharedState::from_config(&config);
    let (event_tx, mut event_rx) = broadcast::channel(16);
    let prober = Arc::new(ScriptedProber::always(healthy()));

    let handle = SchedulerHandle::spawn(&config, prober.clone(), state.clone(), event_tx);

    // interval is one hour, so this can only be the initial tick
    let event = wait_for_tick(&mut event_rx, 2000)
        .await
        .expect("first tick should fire right after spawning");

    assert_eq!(event.target, "192.0.2.1");
    assert_eq!(event.snapshot.overall, Severity::Ok);
    assert_eq!(event.snapshot.status, "Stable");
    assert!(event.hiccup.is_none());
    assert_eq!(prober.calls(), 1);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_tick_event_matches_shared_state() {
    let config = test_config();
    let state = SharedState::from_config(&config);
    let (event_tx, mut event_rx) = broadcast::channel(16);
    let prober = Arc::new(ScriptedProber::always(alive(20.0, 10.0, 30.0, 0.0)));

    let handle = SchedulerHandle::spawn(&config, prober, state.clone(), event_tx);
    let event = wait_for_tick(&mut event_rx, 2000).await.unwrap();

    let snapshot = state.snapshot().await;
    assert_eq!(snapshot.current, event.snapshot);
    assert_eq!(snapshot.current.jitter_ms, Some(20.0));
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(snapshot.history[0].avg_latency_ms, Some(20.0));
    assert_eq!(snapshot.history[0].timestamp, event.snapshot.timestamp.unwrap());
    assert!(snapshot.hiccups.is_empty());

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_critical_latency_records_hiccup() {
    let config = test_config();
    let state = SharedState::from_config(&config);
    let (event_tx, mut event_rx) = broadcast::channel(16);
    let prober = Arc::new(ScriptedProber::new([
        Step::Reply(healthy()),
        Step::Reply(alive(620.0, 600.0, 640.0, 0.0)),
    ]));

    let handle = SchedulerHandle::spawn(&config, prober, state.clone(), event_tx);
    wait_for_tick(&mut event_rx, 2000).await.unwrap();

    let snapshot = handle.probe_now().await.unwrap();
    assert_eq!(snapshot.overall, Severity::Error);
    assert_eq!(snapshot.status, "Error");
    assert_eq!(snapshot.latency, Some(Severity::Error));

    let hiccups = state.hiccups().await;
    assert_eq!(hiccups.len(), 1);
    assert_eq!(hiccups[0].reason, "Critical Latency (620ms)");
    assert_eq!(hiccups[0].latency_ms, Some(620.0));
    assert_eq!(hiccups[0].packet_loss, Some(0.0));
    assert_eq!(Some(hiccups[0].timestamp), snapshot.timestamp);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_warning_does_not_record_hiccup() {
    let config = test_config();
    let state = SharedState::from_config(&config);
    let (event_tx, mut event_rx) = broadcast::channel(16);
    let prober = Arc::new(ScriptedProber::always(alive(200.0, 190.0, 210.0, 10.0)));

    let handle = SchedulerHandle::spawn(&config, prober, state.clone(), event_tx);
    let event = wait_for_tick(&mut event_rx, 2000).await.unwrap();

    assert_eq!(event.snapshot.overall, Severity::Warn);
    assert_eq!(event.snapshot.status, "Warning: High Latency");
    assert_eq!(event.snapshot.loss, Some(Severity::Warn));
    assert!(event.hiccup.is_none());
    assert!(state.hiccups().await.is_empty());

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unreachable_target() {
    let config = test_config();
    let state = SharedState::from_config(&config);
    let (event_tx, mut event_rx) = broadcast::channel(16);
    let prober = Arc::new(ScriptedProber::always(ProbeResult::unreachable()));

    let handle = SchedulerHandle::spawn(&config, prober, state.clone(), event_tx);
    let event = wait_for_tick(&mut event_rx, 2000).await.unwrap();

    assert_eq!(event.snapshot.status, "Error: Host Unreachable");
    assert!(!event.snapshot.is_alive);
    assert_eq!(event.hiccup.unwrap().reason, "Host Unreachable");

    let history = state.history().await;
    assert_eq!(history.len(), 1);
    assert!(!history[0].is_alive);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_history_keeps_most_recent_entries_in_order() {
    let config = Config {
        history_length: 5,
        ..test_config()
    };
    let state = SharedState::from_config(&config);
    let (event_tx, mut event_rx) = broadcast::channel(64);
    let steps = (0..13).map(|i| Step::Reply(alive(f64::from(i), 0.0, 1.0, 0.0)));
    let prober = Arc::new(ScriptedProber::new(steps));

    let handle = SchedulerHandle::spawn(&config, prober.clone(), state.clone(), event_tx);
    wait_for_tick(&mut event_rx, 2000).await.unwrap();

    for _ in 0..12 {
        handle.probe_now().await.unwrap();
    }

    let history = state.history().await;
    let latencies: Vec<_> = history.iter().map(|e| e.avg_latency_ms.unwrap()).collect();
    assert_eq!(latencies, vec![8.0, 9.0, 10.0, 11.0, 12.0]);
    assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    let stats = state.stats().await;
    assert_eq!(stats.ticks, 13);
    assert_eq!(stats.history_length, 5);
    assert_eq!(prober.calls(), 13);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_hiccup_log_only_grows() {
    let config = test_config();
    let state = SharedState::from_config(&config);
    let (event_tx, mut event_rx) = broadcast::channel(64);
    let prober = Arc::new(ScriptedProber::new([
        Step::Reply(ProbeResult::unreachable()),
        Step::Reply(healthy()),
        Step::Reply(alive(10.0, 10.0, 10.0, 50.0)),
        Step::Reply(alive(10.0, 10.0, 10.0, 3.0)),
        Step::Reply(alive(40.0, 0.0, 200.0, 0.0)),
    ]));

    let handle = SchedulerHandle::spawn(&config, prober, state.clone(), event_tx);
    wait_for_tick(&mut event_rx, 2000).await.unwrap();

    let mut counts = vec![state.hiccups().await.len()];
    for _ in 0..4 {
        handle.probe_now().await.unwrap();
        counts.push(state.hiccups().await.len());
    }

    assert_eq!(counts, vec![1, 1, 2, 2, 3]);

    let reasons: Vec<_> = state
        .hiccups()
        .await
        .into_iter()
        .map(|h| h.reason)
        .collect();
    assert_eq!(
        reasons,
        vec![
            "Host Unreachable".to_string(),
            "Critical Packet Loss (50%)".to_string(),
            "High Jitter (200ms)".to_string(),
        ]
    );

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_hiccup_cap_drops_oldest() {
    let config = Config {
        max_hiccups: Some(2),
        ..test_config()
    };
    let state = SharedState::from_config(&config);
    let (event_tx, mut event_rx) = broadcast::channel(64);
    let prober = Arc::new(ScriptedProber::new([
        Step::Reply(alive(600.0, 600.0, 600.0, 0.0)),
        Step::Reply(alive(700.0, 700.0, 700.0, 0.0)),
        Step::Reply(alive(800.0, 800.0, 800.0, 0.0)),
    ]));

    let handle = SchedulerHandle::spawn(&config, prober, state.clone(), event_tx);
    wait_for_tick(&mut event_rx, 2000).await.unwrap();
    handle.probe_now().await.unwrap();
    handle.probe_now().await.unwrap();

    let hiccups = state.hiccups().await;
    assert_eq!(hiccups.len(), 2);
    assert_eq!(hiccups[0].reason, "Critical Latency (700ms)");
    assert_eq!(hiccups[1].reason, "Critical Latency (800ms)");

    let stats = state.stats().await;
    assert_eq!(stats.hiccups_total, 3);
    assert_eq!(stats.hiccups_stored, 2);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_ticks_follow_interval() {
    let config = Config {
        interval_ms: 5000,
        ..test_config()
    };
    let state = SharedState::from_config(&config);
    let (event_tx, _event_rx) = broadcast::channel(64);
    let prober = Arc::new(ScriptedProber::always(healthy()));

    let handle = SchedulerHandle::spawn(&config, prober.clone(), state.clone(), event_tx);

    // ticks at 0s, 5s, 10s and 15s
    tokio::time::sleep(Duration::from_millis(15_100)).await;

    assert_eq!(prober.calls(), 4);
    assert_eq!(state.stats().await.ticks, 4);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_slow_probe_never_overlaps() {
    let config = Config {
        interval_ms: 100,
        ..test_config()
    };
    let state = SharedState::from_config(&config);
    let (event_tx, _event_rx) = broadcast::channel(64);
    let steps = (0..100).map(|_| Step::Slow(Duration::from_millis(350), healthy()));
    let prober = Arc::new(ScriptedProber::new(steps));

    let handle = SchedulerHandle::spawn(&config, prober.clone(), state, event_tx);

    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(prober.max_in_flight(), 1);
    // missed ticks are delayed, not fired in a burst
    let calls = prober.calls();
    assert!((5..=6).contains(&calls), "unexpected number of probes: {calls}");

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_scheduler() {
    let config = test_config();
    let state = SharedState::from_config(&config);
    let (event_tx, mut event_rx) = broadcast::channel(16);
    let prober = Arc::new(ScriptedProber::always(healthy()));

    let handle = SchedulerHandle::spawn(&config, prober, state, event_tx);
    wait_for_tick(&mut event_rx, 2000).await.unwrap();

    handle.shutdown().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(!handle.is_running());
    assert!(handle.probe_now().await.is_err());
}
