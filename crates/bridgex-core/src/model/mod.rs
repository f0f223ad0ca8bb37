// ── Domain model ──
//
// Client-side views over backend state. Nothing here is persisted; every
// value is rebuilt from the gateway on the next refresh.

mod device;
mod pairing;
mod status;
mod transfer;

pub use device::{Device, DeviceRow, DirectoryView, LastSeen, PendingRemoval, id_label};
pub use pairing::{CredentialDisplay, PairingSession};
pub use status::{ConnectionStatus, Presence};
pub use transfer::TransferHandle;
