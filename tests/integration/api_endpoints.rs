//! Integration tests for API endpoints
//!
//! A real scheduler feeds the shared state while the API is queried over
//! HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use hiccup_monitor::{
    HealthSnapshot, Severity,
    actors::scheduler::SchedulerHandle,
    api::{
        ApiConfig, ApiState, HealthResponse, HiccupsResponse, HistoryResponse, StatusResponse,
        spawn_api_server,
    },
    state::SharedState,
};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::helpers::*;

// Helper to create test API server
async fn spawn_test_api(state: SharedState) -> SocketAddr {
    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(), // Random port
        ..ApiConfig::default()
    };

    spawn_api_server(config, ApiState::new(state)).await.unwrap()
}

async fn get(addr: SocketAddr, path: &str) -> reqwest::Response {
    reqwest::get(format!("http://{addr}{path}")).await.unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let addr = spawn_test_api(SharedState::new("192.0.2.1", 10, None)).await;

    let response = get(addr, "/api/v1/health").await;
    assert_eq!(response.status(), StatusCode::OK.as_u16());

    let body: HealthResponse = response.json().await.unwrap();
    assert_eq!(body.status, "initializing");
    assert_eq!(body.target, "192.0.2.1");
    assert_eq!(body.ticks, 0);
    assert_eq!(body.last_tick, None);
}

#[tokio::test]
async fn test_status_is_initializing_before_first_tick() {
    let addr = spawn_test_api(SharedState::new("192.0.2.1", 10, None)).await;

    let body: StatusResponse = get(addr, "/api/v1/status").await.json().await.unwrap();
    assert_eq!(body.target, "192.0.2.1");
    assert_eq!(body.current, HealthSnapshot::initializing());

    let history: HistoryResponse = get(addr, "/api/v1/history").await.json().await.unwrap();
    assert_eq!(history.count, 0);
    assert!(history.entries.is_empty());
}

#[tokio::test]
async fn test_endpoints_follow_scheduler() {
    let config = test_config();
    let state = SharedState::from_config(&config);
    let (event_tx, mut event_rx) = broadcast::channel(16);
    let prober = Arc::new(ScriptedProber::new([
        Step::Reply(healthy()),
        Step::Reply(alive(30.0, 10.0, 50.0, 25.0)),
    ]));

    let handle = SchedulerHandle::spawn(&config, prober, state.clone(), event_tx);
    wait_for_tick(&mut event_rx, 2000).await.unwrap();
    let addr = spawn_test_api(state).await;

    let status: StatusResponse = get(addr, "/api/v1/status").await.json().await.unwrap();
    assert_eq!(status.current.overall, Severity::Ok);
    assert_eq!(status.current.status, "Stable");

    let current = handle.probe_now().await.unwrap();

    let health: HealthResponse = get(addr, "/api/v1/health").await.json().await.unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.ticks, 2);
    assert_eq!(health.last_tick, current.timestamp);

    let status: StatusResponse = get(addr, "/api/v1/status").await.json().await.unwrap();
    assert_eq!(status.current, current);
    assert_eq!(status.current.status, "Error");

    let history: HistoryResponse = get(addr, "/api/v1/history").await.json().await.unwrap();
    assert_eq!(history.count, 2);
    assert_eq!(history.entries[1].packet_loss, Some(25.0));

    let hiccups: HiccupsResponse = get(addr, "/api/v1/hiccups").await.json().await.unwrap();
    assert_eq!(hiccups.count, 1);
    assert_eq!(hiccups.hiccups[0].reason, "Critical Packet Loss (25%)");

    let snapshot: Value = get(addr, "/api/v1/snapshot").await.json().await.unwrap();
    assert_eq!(snapshot["target"], "192.0.2.1");
    assert_eq!(snapshot["current"]["overall"], "error");
    assert_eq!(snapshot["current"]["loss"], "error");
    assert_eq!(snapshot["history"].as_array().unwrap().len(), 2);

    let stats: Value = get(addr, "/api/v1/stats").await.json().await.unwrap();
    assert_eq!(stats["ticks"], 2);
    assert_eq!(stats["hiccups_total"], 1);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_cors_headers_present() {
    let addr = spawn_test_api(SharedState::new("192.0.2.1", 10, None)).await;

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/api/v1/health"))
        .header("Origin", "http://dashboard.example")
        .send()
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap()),
        Some("*")
    );
}

#[tokio::test]
async fn test_unknown_endpoint_is_not_found() {
    let addr = spawn_test_api(SharedState::new("192.0.2.1", 10, None)).await;

    let response = get(addr, "/api/v1/servers").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND.as_u16());
}
