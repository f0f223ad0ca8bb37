// ── Pairing session controller ──
//
// Owns the singleton pairing overlay. A pairing request is only sent while
// the backend is connected and no session is open or in flight. Scheduling
// the follow-up directory refresh is left to the `Controller`, which owns
// the background tasks.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::CoreError;
use crate::gateway::{Gateway, Operation};
use crate::model::{PairingSession, Presence};

pub struct PairingController {
    overlay: watch::Sender<Option<PairingSession>>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag even when the request future is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl PairingController {
    pub fn new() -> Self {
        let (overlay, _) = watch::channel(None);
        Self {
            overlay,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<PairingSession>> {
        self.overlay.subscribe()
    }

    pub fn current(&self) -> Option<PairingSession> {
        self.overlay.borrow().clone()
    }

    pub fn is_open(&self) -> bool {
        self.overlay.borrow().is_some()
    }

    /// Request a pairing credential and open the overlay with it.
    ///
    /// Rejected without contacting the gateway when `presence` is not
    /// connected, or when a session is already open or being requested.
    pub async fn start<G: Gateway>(
        &self,
        gateway: &G,
        presence: &Presence,
        device_name: &str,
    ) -> Result<PairingSession, CoreError> {
        if !presence.pairing_enabled() {
            return Err(CoreError::PairingDisabled);
        }
        if self.is_open() || self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(CoreError::PairingInProgress);
        }
        let _guard = InFlight(&self.in_flight);

        let grant = gateway.start_pairing(device_name).await.inspect_err(|e| {
            warn!(operation = %Operation::StartPairing, error = %e, "pairing request failed");
        })?;

        let session = PairingSession::new(device_name, grant);
        info!(
            device_name,
            device_id = ?session.resulting_device_id,
            "pairing session opened"
        );
        self.overlay.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Hide the overlay. Returns whether it was open.
    pub fn close(&self) -> bool {
        self.overlay.send_if_modified(|overlay| overlay.take().is_some())
    }
}

impl Default for PairingController {
    fn default() -> Self {
        Self::new()
    }
}
