#![allow(clippy::unwrap_used)]
// Presence monitor and background timer tests against a scripted gateway.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{calls, controller, healthy, settle, transport_failure};

use bridgex_core::{ConnectionStatus, Operation};

// ── Health check outcomes ───────────────────────────────────────────

#[tokio::test]
async fn test_successful_check_connects_and_surfaces_version() {
    let ctrl = controller();
    assert_eq!(ctrl.presence().status, ConnectionStatus::Unknown);
    assert!(!ctrl.pairing_enabled());

    let status = ctrl.check_health().await;

    assert_eq!(status, ConnectionStatus::Connected);
    let presence = ctrl.presence();
    assert_eq!(presence.version.as_deref(), Some("0.1.0"));
    assert!(presence.last_error.is_none());
    assert!(ctrl.pairing_enabled());
}

#[tokio::test]
async fn test_failed_check_disconnects_without_error() {
    let ctrl = controller();
    ctrl.check_health().await;
    assert!(ctrl.pairing_enabled());

    ctrl.gateway().health_ok.store(false, Ordering::SeqCst);
    let status = ctrl.check_health().await;

    assert_eq!(status, ConnectionStatus::Disconnected);
    let presence = ctrl.presence();
    assert_eq!(presence.last_error.as_deref(), Some("connection refused"));
    assert!(presence.version.is_none());
    assert!(!ctrl.pairing_enabled());
}

#[tokio::test]
async fn test_status_is_checking_before_reply() {
    let ctrl = controller();
    ctrl.check_health().await;
    let reply = ctrl.gateway().defer_health();

    let task = tokio::spawn({
        let ctrl = ctrl.clone();
        async move { ctrl.check_health().await }
    });
    settle().await;

    assert_eq!(ctrl.presence().status, ConnectionStatus::Checking);
    assert!(!ctrl.pairing_enabled(), "pairing must be disabled while checking");

    reply.send(Ok(healthy("0.2.0"))).unwrap();
    assert_eq!(task.await.unwrap(), ConnectionStatus::Connected);
    assert_eq!(ctrl.presence().version.as_deref(), Some("0.2.0"));
}

// ── Overlapping checks ──────────────────────────────────────────────

#[tokio::test]
async fn test_superseded_failure_does_not_override_newer_success() {
    let ctrl = controller();
    let first = ctrl.gateway().defer_health();
    let second = ctrl.gateway().defer_health();

    let older = tokio::spawn({
        let ctrl = ctrl.clone();
        async move { ctrl.check_health().await }
    });
    settle().await;
    let newer = tokio::spawn({
        let ctrl = ctrl.clone();
        async move { ctrl.check_health().await }
    });
    settle().await;
    assert_eq!(calls(&ctrl.gateway().health_calls), 2);

    second.send(Ok(healthy("0.1.0"))).unwrap();
    assert_eq!(newer.await.unwrap(), ConnectionStatus::Connected);

    first
        .send(Err(transport_failure(Operation::HealthCheck)))
        .unwrap();
    assert_eq!(older.await.unwrap(), ConnectionStatus::Connected);

    assert_eq!(ctrl.presence().status, ConnectionStatus::Connected);
    assert!(ctrl.pairing_enabled());
}

#[tokio::test]
async fn test_superseded_success_does_not_reconnect() {
    let ctrl = controller();
    let first = ctrl.gateway().defer_health();
    let second = ctrl.gateway().defer_health();

    let older = tokio::spawn({
        let ctrl = ctrl.clone();
        async move { ctrl.check_health().await }
    });
    settle().await;
    let newer = tokio::spawn({
        let ctrl = ctrl.clone();
        async move { ctrl.check_health().await }
    });
    settle().await;

    second
        .send(Err(transport_failure(Operation::HealthCheck)))
        .unwrap();
    assert_eq!(newer.await.unwrap(), ConnectionStatus::Disconnected);

    first.send(Ok(healthy("0.1.0"))).unwrap();
    older.await.unwrap();

    assert_eq!(ctrl.presence().status, ConnectionStatus::Disconnected);
    assert!(!ctrl.pairing_enabled());
}

// ── Timers ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_startup_check_waits_for_grace_then_repeats() {
    let ctrl = controller();
    ctrl.start().await;

    tokio::time::sleep(Duration::from_millis(1_999)).await;
    settle().await;
    assert_eq!(calls(&ctrl.gateway().health_calls), 0);
    assert_eq!(ctrl.presence().status, ConnectionStatus::Unknown);

    tokio::time::sleep(Duration::from_millis(2)).await;
    settle().await;
    assert_eq!(calls(&ctrl.gateway().health_calls), 1);
    assert_eq!(calls(&ctrl.gateway().list_calls), 1);
    assert_eq!(ctrl.presence().status, ConnectionStatus::Connected);

    // Interval fires 30 s after start.
    tokio::time::sleep(Duration::from_secs(28)).await;
    settle().await;
    assert_eq!(calls(&ctrl.gateway().health_calls), 2);
    assert_eq!(calls(&ctrl.gateway().list_calls), 2);

    ctrl.shutdown().await;
    tokio::time::sleep(Duration::from_secs(120)).await;
    settle().await;
    assert_eq!(calls(&ctrl.gateway().health_calls), 2);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_before_grace_skips_startup_check() {
    let ctrl = controller();
    ctrl.start().await;
    ctrl.shutdown().await;

    tokio::time::sleep(Duration::from_secs(5)).await;
    settle().await;
    assert_eq!(calls(&ctrl.gateway().health_calls), 0);
}

#[tokio::test(start_paused = true)]
async fn test_second_start_spawns_no_extra_timers() {
    let ctrl = controller();
    ctrl.start().await;
    ctrl.start().await;

    tokio::time::sleep(Duration::from_millis(2_001)).await;
    settle().await;
    assert_eq!(calls(&ctrl.gateway().health_calls), 1);
    assert_eq!(calls(&ctrl.gateway().list_calls), 1);

    tokio::time::sleep(Duration::from_secs(28)).await;
    settle().await;
    assert_eq!(calls(&ctrl.gateway().health_calls), 2);

    ctrl.shutdown().await;
}
