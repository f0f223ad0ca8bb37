// BridgeX REST API wire types
//
// Field presence differs between backend revisions, so optional fields use
// `#[serde(default)]` and aliases cover renamed keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Health ───────────────────────────────────────────────────────────

/// Body of `GET /api/v1/health`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

// ── Devices ──────────────────────────────────────────────────────────

/// One entry of `GET /api/v1/devices`.
///
/// Older backends return a bare display name instead of an object:
/// ```json
/// ["Alice's Laptop", { "id": "abc123", "name": "Phone", "type": "mobile" }]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceRecord {
    BareName(String),
    Structured(StructuredDevice),
}

/// Structured device object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredDevice {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    /// Sent as `device_type` by newer backends and `type` by older ones.
    #[serde(default, rename = "device_type", alias = "type")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub last_seen: Option<RawLastSeen>,
}

/// `last_seen` arrives as RFC 3339 text, a free-form label, or epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLastSeen {
    EpochSecs(i64),
    Text(String),
}

// ── Pairing ──────────────────────────────────────────────────────────

/// Body of `POST /api/v1/pair`.
#[derive(Debug, Clone, Serialize)]
pub struct PairRequest {
    pub device_name: String,
}

/// Pairing session descriptor returned by the backend.
///
/// `qr_data` is image-embeddable (a `data:` URL) when present. Every
/// field is optional: the client degrades to a textual fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairResponse {
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub qr_data: Option<String>,
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

// ── Transfer ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub(crate) struct TransferInitRequest<'a> {
    pub device_id: &'a str,
    pub file_name: &'a str,
    pub file_size: u64,
    pub file_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TransferInitResponse {
    pub transfer_id: String,
    #[serde(default)]
    #[allow(dead_code)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct FinalizeRequest<'a> {
    pub transfer_id: &'a str,
}

/// Result of one completed file upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTransfer {
    pub transfer_id: String,
    pub file_name: String,
    pub file_size: u64,
    /// Lowercase hex SHA-256 of the uploaded bytes.
    pub file_hash: String,
}
