// ── Device directory ──
//
// Fetches paired devices and resolves the backend's mixed record shapes
// into `Device` values once, here. Rendering code only ever sees the
// normalized `DirectoryView`.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, warn};

use bridgex_api::{DeviceRecord, RawLastSeen};

use crate::error::CoreError;
use crate::gateway::{Gateway, Operation};
use crate::model::{Device, DeviceRow, DirectoryView, LastSeen};

pub struct DeviceDirectory {
    view: watch::Sender<DirectoryView>,
    generation: AtomicU64,
}

impl DeviceDirectory {
    pub fn new() -> Self {
        let (view, _) = watch::channel(DirectoryView::default());
        Self {
            view,
            generation: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DirectoryView> {
        self.view.subscribe()
    }

    pub fn current(&self) -> DirectoryView {
        self.view.borrow().clone()
    }

    /// Fetch the device list and replace the published view.
    ///
    /// The view is always replaced wholesale: a failed load yields
    /// `DirectoryView::Error` and drops any previous rows. A load that
    /// completes after a newer one was issued leaves the view untouched.
    pub async fn load_devices<G: Gateway>(&self, gateway: &G) -> Result<Vec<Device>, CoreError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = gateway
            .list_devices()
            .await
            .map(|records| records.into_iter().map(normalize).collect::<Vec<_>>());

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(
                operation = %Operation::ListDevices,
                generation,
                "discarding superseded device list"
            );
            return result;
        }

        match &result {
            Ok(devices) if devices.is_empty() => {
                self.view.send_replace(DirectoryView::Empty);
            }
            Ok(devices) => {
                debug!(count = devices.len(), "device list loaded");
                let rows = devices.iter().cloned().map(DeviceRow::from).collect();
                self.view.send_replace(DirectoryView::Populated(rows));
            }
            Err(e) => {
                warn!(operation = %Operation::ListDevices, error = %e, "failed to load devices");
                self.view.send_replace(DirectoryView::Error {
                    detail: e.detail(),
                });
            }
        }
        result
    }
}

impl Default for DeviceDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve one wire record into a `Device`.
///
/// A bare name, or a structured record without an id, uses the name as its
/// identity.
pub fn normalize(record: DeviceRecord) -> Device {
    match record {
        DeviceRecord::BareName(name) => Device {
            id: name.clone(),
            display_name: name,
            device_type: None,
            last_seen: None,
        },
        DeviceRecord::Structured(d) => Device {
            id: d
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| d.name.clone()),
            display_name: d.name,
            device_type: d.device_type.filter(|t| !t.is_empty()),
            last_seen: d.last_seen.map(last_seen),
        },
    }
}

fn last_seen(raw: RawLastSeen) -> LastSeen {
    match raw {
        RawLastSeen::EpochSecs(secs) => DateTime::from_timestamp(secs, 0)
            .map_or_else(|| LastSeen::Label(secs.to_string()), LastSeen::At),
        RawLastSeen::Text(text) => match DateTime::parse_from_rfc3339(&text) {
            Ok(at) => LastSeen::At(at.with_timezone(&Utc)),
            Err(_) => LastSeen::Label(text),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bridgex_api::StructuredDevice;
    use chrono::TimeZone;

    use super::*;
    use crate::model::id_label;

    fn structured(id: Option<&str>, name: &str, device_type: Option<&str>) -> DeviceRecord {
        DeviceRecord::Structured(StructuredDevice {
            id: id.map(Into::into),
            name: name.into(),
            device_type: device_type.map(Into::into),
            last_seen: None,
        })
    }

    #[test]
    fn bare_name_is_its_own_identity() {
        let device = normalize(DeviceRecord::BareName("Alice's Laptop".into()));
        assert_eq!(device.id, "Alice's Laptop");
        assert_eq!(device.display_name, "Alice's Laptop");
        assert!(device.device_type.is_none());
    }

    #[test]
    fn structured_record_keeps_id_and_type() {
        let device = normalize(structured(Some("abc123..."), "Phone", Some("mobile")));
        assert_eq!(device.id, "abc123...");
        assert_eq!(device.display_name, "Phone");
        assert_eq!(device.device_type.as_deref(), Some("mobile"));

        let row = DeviceRow::from(device);
        assert_eq!(row.id_label, format!("{}...", "abc123.."));
        assert_eq!(row.id_label, id_label("abc123..."));
    }

    #[test]
    fn structured_record_without_id_uses_name() {
        let device = normalize(structured(None, "Tablet", None));
        assert_eq!(device.id, "Tablet");

        let device = normalize(structured(Some(""), "Tablet", None));
        assert_eq!(device.id, "Tablet");
    }

    #[test]
    fn last_seen_parses_instants_and_keeps_labels() {
        let at = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap();
        assert_eq!(
            last_seen(RawLastSeen::Text("2024-06-15T10:30:00Z".into())),
            LastSeen::At(at)
        );
        assert_eq!(
            last_seen(RawLastSeen::EpochSecs(at.timestamp())),
            LastSeen::At(at)
        );
        assert_eq!(
            last_seen(RawLastSeen::Text("yesterday".into())),
            LastSeen::Label("yesterday".into())
        );
    }
}
