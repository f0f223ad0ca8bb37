//! Data bridge: connects [`Controller`] watch channels to TUI actions.
//!
//! Runs as a background task: pushes the current snapshot of every channel,
//! then forwards each change as an [`Action`] until cancelled or until the
//! controller goes away.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use bridgex_core::{Controller, Gateway};

use crate::action::Action;

pub async fn spawn_data_bridge<G: Gateway>(
    controller: Controller<G>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut presence = controller.subscribe_presence();
    let mut directory = controller.subscribe_directory();
    let mut pairing = controller.subscribe_pairing();
    let mut removal = controller.subscribe_pending_removal();
    drop(controller);

    // Initial snapshots so the screen has data immediately
    let _ = action_tx.send(Action::PresenceUpdated(
        presence.borrow_and_update().clone(),
    ));
    let _ = action_tx.send(Action::DirectoryUpdated(
        directory.borrow_and_update().clone(),
    ));
    let _ = action_tx.send(Action::PairingUpdated(pairing.borrow_and_update().clone()));
    let _ = action_tx.send(Action::RemovalUpdated(removal.borrow_and_update().clone()));

    loop {
        let action = tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Ok(()) = presence.changed() => {
                Action::PresenceUpdated(presence.borrow_and_update().clone())
            }
            Ok(()) = directory.changed() => {
                Action::DirectoryUpdated(directory.borrow_and_update().clone())
            }
            Ok(()) = pairing.changed() => {
                Action::PairingUpdated(pairing.borrow_and_update().clone())
            }
            Ok(()) = removal.changed() => {
                Action::RemovalUpdated(removal.borrow_and_update().clone())
            }
            else => break,
        };

        if action_tx.send(action).is_err() {
            break;
        }
    }

    debug!("data bridge stopped");
}
