// Scheduler behaviour: immediate first tick, overlap skipping, resilience.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cloudtel_core::{MemoryStore, PollOutcome, PollState, RuntimeConfig, Telemetry};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(interval: Duration) -> (MockServer, Telemetry, Arc<MemoryStore>) {
    let server = MockServer::start().await;
    let mut cfg = RuntimeConfig::new(
        Url::parse(&server.uri()).unwrap(),
        "client-abc",
        SecretString::from("s3cr3t".to_string()),
        "dev-1",
    );
    cfg.poll_interval = interval;
    cfg.enrich = None;

    Mock::given(method("GET"))
        .and(path("/v1.0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": { "access_token": "tok-1", "expire_time": 7200 }
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let telemetry = Telemetry::new(&cfg, store.clone()).unwrap();
    (server, telemetry, store)
}

async fn status_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path().ends_with("/status"))
        .count()
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_manual_trigger_during_run_is_skipped() {
    let (server, telemetry, store) = setup(Duration::from_secs(60)).await;
    Mock::given(method("GET"))
        .and(path("/v1.0/iot-03/devices/dev-1/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "success": true,
                    "result": [{ "code": "temp_current", "value": 220 }]
                }))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;

    let poller = telemetry.poller().clone();
    let first = tokio::spawn(async move { poller.trigger().await });

    let mut state = telemetry.poller().state();
    state
        .wait_for(|s| *s == PollState::Running)
        .await
        .unwrap();

    let second = telemetry.poller().trigger().await;
    assert_eq!(second, PollOutcome::Skipped);
    assert_eq!(*telemetry.poller().state().borrow(), PollState::Running);
    assert_eq!(telemetry.poller().trigger().await, PollOutcome::Skipped);

    assert!(first.await.unwrap().is_stored());
    assert_eq!(*telemetry.poller().state().borrow(), PollState::Idle);
    assert_eq!(store.len(), 1);
    assert_eq!(status_requests(&server).await, 1);
}

#[tokio::test]
async fn test_first_tick_fires_immediately() {
    let (server, telemetry, store) = setup(Duration::from_secs(3600)).await;
    Mock::given(method("GET"))
        .and(path("/v1.0/iot-03/devices/dev-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": [{ "code": "temp_current", "value": 20 }]
        })))
        .mount(&server)
        .await;

    let handle = telemetry.poller().spawn();
    let mut outcomes = telemetry.poller().last_outcome();
    tokio::time::timeout(
        Duration::from_secs(5),
        outcomes.wait_for(Option::is_some),
    )
    .await
    .unwrap()
    .unwrap();

    telemetry.poller().shutdown();
    handle.await.unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(status_requests(&server).await, 1);
}

#[tokio::test]
async fn test_failures_do_not_stop_the_schedule() {
    let (server, telemetry, store) = setup(Duration::from_millis(50)).await;
    Mock::given(method("GET"))
        .and(path("/v1.0/iot-03/devices/dev-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false, "code": 2009, "msg": "device offline"
        })))
        .mount(&server)
        .await;

    let handle = telemetry.poller().spawn();
    tokio::time::sleep(Duration::from_millis(400)).await;
    telemetry.poller().shutdown();
    handle.await.unwrap();

    assert!(status_requests(&server).await >= 3);
    assert!(store.is_empty());
    let last = telemetry.poller().last_outcome().borrow().clone();
    assert!(matches!(last, Some(PollOutcome::Failed { .. })));
}

#[tokio::test]
async fn test_slow_runs_never_overlap() {
    let (server, telemetry, store) = setup(Duration::from_millis(40)).await;
    Mock::given(method("GET"))
        .and(path("/v1.0/iot-03/devices/dev-1/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "success": true,
                    "result": [{ "code": "temp_current", "value": 215 }]
                }))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let handle = telemetry.poller().spawn();
    tokio::time::sleep(Duration::from_millis(500)).await;
    telemetry.poller().shutdown();
    handle.await.unwrap();

    // Ticks every 40ms against 200ms runs: most ticks must have been skipped.
    let requests = status_requests(&server).await;
    assert!(requests >= 1);
    assert!(requests <= 4, "runs overlapped: {requests} status calls");
    assert_eq!(store.len(), requests);
    assert_eq!(*telemetry.poller().state().borrow(), PollState::Idle);
}
