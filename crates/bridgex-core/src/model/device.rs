use chrono::{DateTime, Utc};
use serde::Serialize;

/// Characters of a device identity shown before the ellipsis.
const ID_PREFIX_CHARS: usize = 8;

/// A paired device, normalized from whatever shape the backend sent.
///
/// Owned by the backend. The client never edits one; it only asks for
/// removal and re-fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    /// Backend identity. Equals `display_name` for bare-name records.
    pub id: String,
    pub display_name: String,
    pub device_type: Option<String>,
    pub last_seen: Option<LastSeen>,
}

/// When the device was last seen: a parsed instant, or the backend's label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LastSeen {
    At(DateTime<Utc>),
    Label(String),
}

/// A device as rendered in the directory list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceRow {
    pub device: Device,
    /// Truncated identity, e.g. `abc12345...`.
    pub id_label: String,
}

impl From<Device> for DeviceRow {
    fn from(device: Device) -> Self {
        let id_label = id_label(&device.id);
        Self { device, id_label }
    }
}

/// What the directory panel shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum DirectoryView {
    /// No load has completed yet.
    #[default]
    NotLoaded,
    /// The backend has no paired devices.
    Empty,
    /// The last load failed. No rows are kept.
    Error { detail: String },
    /// Rows in backend order.
    Populated(Vec<DeviceRow>),
}

impl DirectoryView {
    pub fn rows(&self) -> &[DeviceRow] {
        match self {
            Self::Populated(rows) => rows,
            _ => &[],
        }
    }

    pub fn find(&self, device_id: &str) -> Option<&Device> {
        self.rows()
            .iter()
            .map(|row| &row.device)
            .find(|d| d.id == device_id)
    }
}

/// A removal the user asked for but has not confirmed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingRemoval {
    pub device_id: String,
    pub display_name: String,
}

/// First eight characters of `id`, without splitting a code point.
pub(crate) fn id_prefix(id: &str) -> &str {
    match id.char_indices().nth(ID_PREFIX_CHARS) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Truncated identity shown next to a device: first eight characters
/// followed by `...`.
pub fn id_label(id: &str) -> String {
    format!("{}...", id_prefix(id))
}
