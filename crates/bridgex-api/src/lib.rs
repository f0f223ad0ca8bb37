// bridgex-api: Async Rust client for the BridgeX backend's local REST API.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

mod devices;
mod health;
mod pairing;
mod transfer;

pub use client::BackendClient;
pub use error::Error;
pub use models::{
    DeviceRecord, FileTransfer, HealthResponse, PairRequest, PairResponse, RawLastSeen,
    StructuredDevice,
};
pub use transfer::CHUNK_SIZE;
pub use transport::TransportConfig;
