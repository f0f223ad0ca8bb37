//! Client presence and pairing state machine for BridgeX.
//!
//! This crate sits between `bridgex-api` and the terminal front-end:
//!
//! - **[`Controller`]** owns every piece of client state and the background
//!   timers. State is published through `tokio::sync::watch` channels and
//!   only changes through controller methods or [`Controller::dispatch`].
//!
//! - **[`Gateway`]** is the backend boundary. `BackendClient` implements it
//!   over HTTP; tests substitute an in-memory double.
//!
//! - **Presence** ([`presence`]), **directory** ([`directory`]) and
//!   **pairing** ([`pairing`]) each apply only the result of their latest
//!   issued request.
//!
//! - **[`BackendProcess`]** optionally launches the backend server and waits
//!   for it to become healthy.

pub mod backend;
pub mod config;
pub mod controller;
pub mod directory;
pub mod dispatcher;
pub mod error;
pub mod gateway;
pub mod model;
pub mod pairing;
pub mod presence;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::BackendProcess;
pub use config::ControllerConfig;
pub use controller::Controller;
pub use dispatcher::{Intent, Outcome};
pub use error::CoreError;
pub use gateway::{Gateway, Operation};

pub use model::{
    ConnectionStatus, CredentialDisplay, Device, DeviceRow, DirectoryView, LastSeen,
    PairingSession, PendingRemoval, Presence, TransferHandle, id_label,
};
