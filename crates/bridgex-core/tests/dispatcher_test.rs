#![allow(clippy::unwrap_used)]
// Intent routing, device directory views and removal confirmation.

mod common;

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;

use pretty_assertions::assert_eq;

use bridgex_api::{DeviceRecord, StructuredDevice};
use bridgex_core::backend::wait_until_healthy;
use bridgex_core::{BackendProcess, ConnectionStatus, CoreError, DirectoryView, Intent, Outcome};

use common::{ScriptedGateway, calls, controller, settle};

fn phone() -> DeviceRecord {
    DeviceRecord::Structured(StructuredDevice {
        id: Some("abc123456789".into()),
        name: "Phone".into(),
        device_type: Some("mobile".into()),
        last_seen: None,
    })
}

// ── Directory ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_directory_renders_empty_view() {
    let ctrl = controller();
    assert_eq!(ctrl.directory(), DirectoryView::NotLoaded);

    let devices = ctrl.load_devices().await.unwrap();

    assert!(devices.is_empty());
    assert_eq!(ctrl.directory(), DirectoryView::Empty);
}

#[tokio::test]
async fn test_directory_keeps_backend_order() {
    let ctrl = controller();
    ctrl.gateway().set_devices(vec![
        DeviceRecord::BareName("Zed's Tablet".into()),
        phone(),
        DeviceRecord::BareName("Alice's Laptop".into()),
    ]);

    ctrl.load_devices().await.unwrap();

    let view = ctrl.directory();
    let names: Vec<_> = view
        .rows()
        .iter()
        .map(|r| r.device.display_name.as_str())
        .collect();
    assert_eq!(names, ["Zed's Tablet", "Phone", "Alice's Laptop"]);
    assert_eq!(view.rows()[1].id_label, "abc12345...");
    assert_eq!(view.rows()[2].device.id, "Alice's Laptop");
}

#[tokio::test]
async fn test_directory_failure_replaces_previous_rows() {
    let ctrl = controller();
    ctrl.gateway().set_devices(vec![phone()]);
    ctrl.load_devices().await.unwrap();
    assert_eq!(ctrl.directory().rows().len(), 1);

    ctrl.gateway().fail_devices("database locked");
    let err = ctrl.load_devices().await.unwrap_err();

    assert_eq!(err.detail(), "database locked");
    assert_eq!(
        ctrl.directory(),
        DirectoryView::Error {
            detail: "database locked".into()
        }
    );
    assert!(ctrl.directory().rows().is_empty());
}

#[tokio::test]
async fn test_superseded_empty_list_does_not_clear_newer_rows() {
    let ctrl = controller();
    let first = ctrl.gateway().defer_devices();
    let second = ctrl.gateway().defer_devices();

    let older = tokio::spawn({
        let ctrl = ctrl.clone();
        async move { ctrl.load_devices().await }
    });
    settle().await;
    let newer = tokio::spawn({
        let ctrl = ctrl.clone();
        async move { ctrl.load_devices().await }
    });
    settle().await;
    assert_eq!(calls(&ctrl.gateway().list_calls), 2);

    second.send(Ok(vec![phone()])).unwrap();
    assert_eq!(newer.await.unwrap().unwrap().len(), 1);

    first.send(Ok(Vec::new())).unwrap();
    // The caller still gets its own answer; the view does not.
    assert!(older.await.unwrap().unwrap().is_empty());

    let view = ctrl.directory();
    assert!(matches!(view, DirectoryView::Populated(_)), "got {view:?}");
    assert_eq!(view.rows()[0].device.id, "abc123456789");
}

// ── Refresh ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_runs_presence_and_directory() {
    let ctrl = controller();
    ctrl.gateway()
        .set_devices(vec![phone(), DeviceRecord::BareName("Laptop".into())]);

    let outcome = ctrl.dispatch(Intent::Refresh).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::Refreshed {
            status: ConnectionStatus::Connected,
            device_count: Some(2),
        }
    );
    assert_eq!(calls(&ctrl.gateway().health_calls), 1);
    assert_eq!(calls(&ctrl.gateway().list_calls), 1);
}

#[tokio::test]
async fn test_refresh_reports_both_failures_without_error() {
    let ctrl = controller();
    ctrl.gateway().health_ok.store(false, Ordering::SeqCst);
    ctrl.gateway().fail_devices("backend unreachable");

    let outcome = ctrl.dispatch(Intent::Refresh).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::Refreshed {
            status: ConnectionStatus::Disconnected,
            device_count: None,
        }
    );
    assert!(matches!(ctrl.directory(), DirectoryView::Error { .. }));
}

// ── Pairing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_pair_intent_uses_configured_name() {
    let ctrl = controller();
    ctrl.check_health().await;

    let outcome = ctrl.dispatch(Intent::Pair).await.unwrap();

    assert!(matches!(outcome, Outcome::PairingOpened(_)));
    assert_eq!(
        ctrl.gateway().paired_names.lock().unwrap().as_slice(),
        ["Desktop PC".to_owned()]
    );

    let outcome = ctrl.dispatch(Intent::ClosePairing).await.unwrap();
    assert_eq!(outcome, Outcome::PairingClosed { was_open: true });
}

// ── Removal ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_declined_removal_makes_no_call_and_keeps_view() {
    let ctrl = controller();
    ctrl.gateway().set_devices(vec![phone()]);
    ctrl.load_devices().await.unwrap();
    let before = ctrl.directory();

    let outcome = ctrl
        .dispatch(Intent::RemoveDevice {
            device_id: "abc123456789".into(),
        })
        .await
        .unwrap();
    let Outcome::RemovalPending(pending) = outcome else {
        panic!("expected pending removal, got {outcome:?}");
    };
    assert_eq!(pending.display_name, "Phone");
    assert_eq!(ctrl.pending_removal(), Some(pending.clone()));

    let outcome = ctrl.dispatch(Intent::DeclineRemoval).await.unwrap();

    assert_eq!(outcome, Outcome::RemovalDeclined(pending));
    assert_eq!(calls(&ctrl.gateway().remove_calls), 0);
    assert_eq!(calls(&ctrl.gateway().list_calls), 1);
    assert_eq!(ctrl.directory(), before);
    assert!(ctrl.pending_removal().is_none());
}

#[tokio::test]
async fn test_confirmed_removal_calls_gateway_then_reloads() {
    let ctrl = controller();
    ctrl.gateway()
        .set_devices(vec![phone(), DeviceRecord::BareName("Laptop".into())]);
    ctrl.load_devices().await.unwrap();

    ctrl.request_removal("Laptop").unwrap();
    ctrl.gateway().set_devices(vec![phone()]);
    let outcome = ctrl.dispatch(Intent::ConfirmRemoval).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::DeviceRemoved {
            device_id: "Laptop".into()
        }
    );
    assert_eq!(
        ctrl.gateway().removed.lock().unwrap().as_slice(),
        ["Laptop".to_owned()]
    );
    assert_eq!(calls(&ctrl.gateway().list_calls), 2);
    assert_eq!(ctrl.directory().rows().len(), 1);
    assert!(ctrl.pending_removal().is_none());
}

#[tokio::test]
async fn test_removal_of_unlisted_device_is_rejected() {
    let ctrl = controller();
    ctrl.load_devices().await.unwrap();

    let err = ctrl.request_removal("ghost").unwrap_err();
    assert_eq!(
        err,
        CoreError::DeviceNotFound {
            identifier: "ghost".into()
        }
    );
    assert!(ctrl.pending_removal().is_none());
}

#[tokio::test]
async fn test_confirm_and_decline_need_a_pending_removal() {
    let ctrl = controller();

    assert_eq!(
        ctrl.dispatch(Intent::ConfirmRemoval).await.unwrap_err(),
        CoreError::NoPendingRemoval
    );
    assert_eq!(
        ctrl.dispatch(Intent::DeclineRemoval).await.unwrap_err(),
        CoreError::NoPendingRemoval
    );
    assert_eq!(calls(&ctrl.gateway().remove_calls), 0);
}

// ── Send file ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_send_without_paths_is_rejected_locally() {
    let ctrl = controller();

    let err = ctrl
        .dispatch(Intent::SendFile {
            device_id: "abc123456789".into(),
            paths: Vec::new(),
        })
        .await
        .unwrap_err();

    assert_eq!(err, CoreError::NoFilesSelected);
    assert_eq!(calls(&ctrl.gateway().send_calls), 0);
}

#[tokio::test]
async fn test_send_forwards_paths_in_order() {
    let ctrl = controller();
    let paths = vec![PathBuf::from("/tmp/a.txt"), PathBuf::from("/tmp/b.txt")];

    let outcome = ctrl
        .dispatch(Intent::SendFile {
            device_id: "abc123456789".into(),
            paths: paths.clone(),
        })
        .await
        .unwrap();

    let Outcome::FileSent(handle) = outcome else {
        panic!("expected FileSent, got {outcome:?}");
    };
    assert_eq!(handle.device_id, "abc123456789");
    let names: Vec<_> = handle.files.iter().map(|f| f.file_name.as_str()).collect();
    assert_eq!(names, ["a.txt", "b.txt"]);
    assert_eq!(*ctrl.gateway().sent.lock().unwrap(), paths);
}

// ── Backend readiness ───────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_wait_until_healthy_polls_until_backend_answers() {
    let gateway = std::sync::Arc::new(ScriptedGateway::new());
    gateway.health_ok.store(false, Ordering::SeqCst);

    let flip = tokio::spawn({
        let gateway = std::sync::Arc::clone(&gateway);
        async move {
            tokio::time::sleep(Duration::from_millis(900)).await;
            gateway.health_ok.store(true, Ordering::SeqCst);
        }
    });

    wait_until_healthy(gateway.as_ref(), Duration::from_secs(10))
        .await
        .unwrap();
    flip.await.unwrap();
    settle().await;

    // Probes at 0, 200, 400, 600, 800 and 1000 ms.
    assert_eq!(calls(&gateway.health_calls), 6);
}

#[tokio::test(start_paused = true)]
async fn test_wait_until_healthy_times_out() {
    let gateway = ScriptedGateway::new();
    gateway.health_ok.store(false, Ordering::SeqCst);

    let err = wait_until_healthy(&gateway, Duration::from_secs(3))
        .await
        .unwrap_err();

    assert_eq!(err, CoreError::StartupTimeout { timeout_secs: 3 });
}

/// A program that keeps running with null stdio until killed.
#[cfg(unix)]
fn long_running_binary() -> Option<PathBuf> {
    ["/usr/bin/yes", "/bin/yes"]
        .into_iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

#[cfg(unix)]
#[tokio::test]
async fn test_restart_relaunches_backend_on_same_port() {
    let Some(binary) = long_running_binary() else {
        return;
    };
    let gateway = ScriptedGateway::new();
    let mut process = BackendProcess::spawn(&binary, 18_080).unwrap();
    let first_pid = process.pid().unwrap();

    process
        .restart(&gateway, Duration::from_secs(10))
        .await
        .unwrap();

    assert!(process.pid().is_some());
    assert_ne!(process.pid(), Some(first_pid));
    assert_eq!(process.port(), 18_080);
    assert_eq!(calls(&gateway.health_calls), 1);
    process.stop().await.unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn test_restart_with_vanished_binary_is_a_process_error() {
    let Some(target) = long_running_binary() else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let binary = dir.path().join("bridgex-server");
    std::os::unix::fs::symlink(&target, &binary).unwrap();

    let gateway = ScriptedGateway::new();
    let mut process = BackendProcess::spawn(&binary, 18_081).unwrap();
    std::fs::remove_file(&binary).unwrap();

    let err = process
        .restart(&gateway, Duration::from_secs(10))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Process { .. }), "got: {err:?}");
    assert_eq!(calls(&gateway.health_calls), 0);
}
