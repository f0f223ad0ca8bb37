// ── Action dispatcher ──
//
// Every user intent flows through `Controller::dispatch`, which routes it
// to presence, directory, pairing or the gateway and reports an `Outcome`
// the front-end turns into a notification. Device removal is two-step: a
// request records a pending confirmation, and only a confirmation reaches
// the gateway.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::controller::Controller;
use crate::error::CoreError;
use crate::gateway::{Gateway, Operation};
use crate::model::{ConnectionStatus, PairingSession, PendingRemoval, TransferHandle};

/// User-triggered requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    // ── Presence / directory ─────────────────────────────────────────
    Refresh,

    // ── Pairing ──────────────────────────────────────────────────────
    /// Pair using the configured local device name.
    Pair,
    ClosePairing,

    // ── Device removal ───────────────────────────────────────────────
    RemoveDevice { device_id: String },
    ConfirmRemoval,
    DeclineRemoval,

    // ── Transfer ─────────────────────────────────────────────────────
    SendFile {
        device_id: String,
        paths: Vec<PathBuf>,
    },
}

/// What a dispatched intent did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `device_count` is `None` when the directory failed to load.
    Refreshed {
        status: ConnectionStatus,
        device_count: Option<usize>,
    },
    PairingOpened(PairingSession),
    /// `was_open` is false when the overlay was already hidden.
    PairingClosed { was_open: bool },
    RemovalPending(PendingRemoval),
    DeviceRemoved { device_id: String },
    RemovalDeclined(PendingRemoval),
    FileSent(TransferHandle),
}

impl<G: Gateway> Controller<G> {
    /// Route one intent.
    pub async fn dispatch(&self, intent: Intent) -> Result<Outcome, CoreError> {
        debug!(?intent, "dispatching");
        match intent {
            Intent::Refresh => {
                let (status, devices) = self.refresh().await;
                Ok(Outcome::Refreshed {
                    status,
                    device_count: devices.ok().as_ref().map(Vec::len),
                })
            }
            Intent::Pair => {
                let name = self.config().device_name.clone();
                self.start_pairing(&name)
                    .await
                    .map(Outcome::PairingOpened)
            }
            Intent::ClosePairing => Ok(Outcome::PairingClosed {
                was_open: self.close_pairing(),
            }),
            Intent::RemoveDevice { device_id } => {
                self.request_removal(&device_id).map(Outcome::RemovalPending)
            }
            Intent::ConfirmRemoval => self
                .confirm_removal()
                .await
                .map(|device_id| Outcome::DeviceRemoved { device_id }),
            Intent::DeclineRemoval => self.decline_removal().map(Outcome::RemovalDeclined),
            Intent::SendFile { device_id, paths } => self
                .send_file(&device_id, &paths)
                .await
                .map(Outcome::FileSent),
        }
    }

    // ── Device removal ───────────────────────────────────────────────

    /// Record a removal awaiting confirmation. The device must be listed.
    pub fn request_removal(&self, device_id: &str) -> Result<PendingRemoval, CoreError> {
        let device = self
            .inner
            .directory
            .current()
            .find(device_id)
            .cloned()
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: device_id.to_owned(),
            })?;

        let pending = PendingRemoval {
            device_id: device.id,
            display_name: device.display_name,
        };
        self.inner
            .pending_removal
            .send_replace(Some(pending.clone()));
        Ok(pending)
    }

    /// Remove the pending device, then reload the directory.
    pub async fn confirm_removal(&self) -> Result<String, CoreError> {
        let pending = self
            .inner
            .pending_removal
            .send_replace(None)
            .ok_or(CoreError::NoPendingRemoval)?;

        self.inner
            .gateway
            .remove_device(&pending.device_id)
            .await
            .inspect_err(|e| {
                warn!(
                    operation = %Operation::RemoveDevice,
                    device_id = %pending.device_id,
                    error = %e,
                    "device removal failed"
                );
            })?;
        info!(device_id = %pending.device_id, "device removed");

        let _ = self.load_devices().await;
        Ok(pending.device_id)
    }

    /// Drop the pending removal. Never contacts the gateway.
    pub fn decline_removal(&self) -> Result<PendingRemoval, CoreError> {
        self.inner
            .pending_removal
            .send_replace(None)
            .ok_or(CoreError::NoPendingRemoval)
    }

    // ── Transfer ─────────────────────────────────────────────────────

    /// Send `paths` to `device_id`, one file at a time.
    pub async fn send_file(
        &self,
        device_id: &str,
        paths: &[PathBuf],
    ) -> Result<TransferHandle, CoreError> {
        if paths.is_empty() {
            return Err(CoreError::NoFilesSelected);
        }
        let handle = self.inner.gateway.send_file(device_id, paths).await?;
        info!(
            device_id,
            files = handle.files.len(),
            bytes = handle.total_bytes(),
            "files sent"
        );
        Ok(handle)
    }
}
