// ── Controller ──
//
// Single owner of client state. Presence, directory and pairing each
// publish through a `watch` channel; the only writers are the completion
// handlers behind the methods below. Background timers (startup grace,
// recurring refresh, post-pairing refresh) are spawned tasks tied to one
// cancellation token.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use bridgex_api::{BackendClient, TransportConfig};

use crate::config::ControllerConfig;
use crate::directory::DeviceDirectory;
use crate::error::CoreError;
use crate::gateway::Gateway;
use crate::model::{
    ConnectionStatus, Device, DirectoryView, PairingSession, PendingRemoval, Presence,
};
use crate::pairing::PairingController;
use crate::presence::PresenceMonitor;

/// The client state machine.
///
/// Cheaply cloneable via `Arc<ControllerInner>`; every clone drives and
/// observes the same state.
pub struct Controller<G: Gateway> {
    pub(crate) inner: Arc<ControllerInner<G>>,
}

impl<G: Gateway> Clone for Controller<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

pub(crate) struct ControllerInner<G> {
    pub(crate) config: ControllerConfig,
    pub(crate) gateway: G,
    pub(crate) presence: PresenceMonitor,
    pub(crate) directory: DeviceDirectory,
    pub(crate) pairing: PairingController,
    pub(crate) pending_removal: watch::Sender<Option<PendingRemoval>>,
    started: AtomicBool,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller<BackendClient> {
    /// Build a controller talking HTTP to `config.backend_url`.
    pub fn with_http(config: ControllerConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::with_timeout(config.timeout);
        let client = BackendClient::new(config.backend_url.clone(), &transport).map_err(|e| {
            CoreError::Config {
                message: e.to_string(),
            }
        })?;
        Ok(Self::new(client, config))
    }
}

impl<G: Gateway> Controller<G> {
    /// Create a controller. Nothing runs until [`start()`](Self::start).
    pub fn new(gateway: G, config: ControllerConfig) -> Self {
        let (pending_removal, _) = watch::channel(None);
        Self {
            inner: Arc::new(ControllerInner {
                config,
                gateway,
                presence: PresenceMonitor::new(),
                directory: DeviceDirectory::new(),
                pairing: PairingController::new(),
                pending_removal,
                started: AtomicBool::new(false),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn gateway(&self) -> &G {
        &self.inner.gateway
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn the startup check (after the grace delay) and the recurring
    /// refresh. Later calls are no-ops.
    pub async fn start(&self) {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            debug!("controller already started");
            return;
        }
        let mut handles = self.inner.task_handles.lock().await;
        let cancel = self.inner.cancel.clone();

        let ctrl = self.clone();
        let grace = self.inner.config.startup_grace;
        handles.push(tokio::spawn(startup_task(ctrl, grace, cancel.clone())));

        let interval = self.inner.config.refresh_interval;
        if !interval.is_zero() {
            let ctrl = self.clone();
            handles.push(tokio::spawn(refresh_task(ctrl, interval, cancel)));
        }
        info!(
            backend = %self.inner.config.backend_url,
            interval_secs = interval.as_secs(),
            "controller started"
        );
    }

    /// Cancel every background task and wait for them to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("controller stopped");
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn subscribe_presence(&self) -> watch::Receiver<Presence> {
        self.inner.presence.subscribe()
    }

    pub fn subscribe_directory(&self) -> watch::Receiver<DirectoryView> {
        self.inner.directory.subscribe()
    }

    pub fn subscribe_pairing(&self) -> watch::Receiver<Option<PairingSession>> {
        self.inner.pairing.subscribe()
    }

    pub fn subscribe_pending_removal(&self) -> watch::Receiver<Option<PendingRemoval>> {
        self.inner.pending_removal.subscribe()
    }

    pub fn presence(&self) -> Presence {
        self.inner.presence.current()
    }

    pub fn directory(&self) -> DirectoryView {
        self.inner.directory.current()
    }

    pub fn pairing_session(&self) -> Option<PairingSession> {
        self.inner.pairing.current()
    }

    pub fn pending_removal(&self) -> Option<PendingRemoval> {
        self.inner.pending_removal.borrow().clone()
    }

    /// The pairing control is enabled iff the backend is connected.
    pub fn pairing_enabled(&self) -> bool {
        self.inner.presence.current().pairing_enabled()
    }

    // ── Transitions ──────────────────────────────────────────────────

    pub async fn check_health(&self) -> ConnectionStatus {
        self.inner.presence.check_health(&self.inner.gateway).await
    }

    pub async fn load_devices(&self) -> Result<Vec<Device>, CoreError> {
        self.inner.directory.load_devices(&self.inner.gateway).await
    }

    /// Check presence and reload the directory concurrently.
    pub async fn refresh(&self) -> (ConnectionStatus, Result<Vec<Device>, CoreError>) {
        tokio::join!(self.check_health(), self.load_devices())
    }

    /// Start a pairing session announcing `device_name`.
    ///
    /// On success the overlay opens and exactly one directory refresh is
    /// scheduled after `pairing_refresh_delay`.
    pub async fn start_pairing(&self, device_name: &str) -> Result<PairingSession, CoreError> {
        let presence = self.inner.presence.current();
        let session = self
            .inner
            .pairing
            .start(&self.inner.gateway, &presence, device_name)
            .await?;

        let ctrl = self.clone();
        let delay = self.inner.config.pairing_refresh_delay;
        let cancel = self.inner.cancel.clone();
        let mut handles = self.inner.task_handles.lock().await;
        handles.retain(|h| !h.is_finished());
        handles.push(tokio::spawn(pairing_follow_up_task(ctrl, delay, cancel)));

        Ok(session)
    }

    /// Hide the pairing overlay. Idempotent; cancels nothing.
    pub fn close_pairing(&self) -> bool {
        self.inner.pairing.close()
    }
}

// ── Background tasks ─────────────────────────────────────────────────

async fn startup_task<G: Gateway>(
    controller: Controller<G>,
    grace: Duration,
    cancel: CancellationToken,
) {
    tokio::select! {
        biased;
        () = cancel.cancelled() => {}
        () = tokio::time::sleep(grace) => {
            let (status, _) = controller.refresh().await;
            debug!(%status, "startup check complete");
        }
    }
}

async fn refresh_task<G: Gateway>(
    controller: Controller<G>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let (status, _) = controller.refresh().await;
                debug!(%status, "periodic refresh complete");
            }
        }
    }
}

async fn pairing_follow_up_task<G: Gateway>(
    controller: Controller<G>,
    delay: Duration,
    cancel: CancellationToken,
) {
    tokio::select! {
        biased;
        () = cancel.cancelled() => {}
        () = tokio::time::sleep(delay) => {
            debug!("refreshing devices after pairing");
            let _ = controller.load_devices().await;
        }
    }
}
