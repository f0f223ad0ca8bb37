// ── Runtime controller configuration ──
//
// Describes where the backend lives and how the controller paces its
// checks. Never touches disk: the front-end builds one (usually from
// `bridgex-config`) and hands it in.

use std::time::Duration;

use url::Url;

/// Default pause before the first health check, giving a freshly started
/// backend time to bind its port.
pub const DEFAULT_STARTUP_GRACE: Duration = Duration::from_secs(2);

/// Default period of the background presence and directory refresh.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Default delay between a successful pairing start and the directory
/// refresh that picks up the newly paired device.
pub const DEFAULT_PAIRING_REFRESH_DELAY: Duration = Duration::from_secs(1);

/// Configuration for one controller instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Backend root, e.g. `http://127.0.0.1:8080`.
    pub backend_url: Url,
    /// Name this machine announces when pairing.
    pub device_name: String,
    /// Per-request timeout.
    pub timeout: Duration,
    pub startup_grace: Duration,
    /// Zero disables the background refresh.
    pub refresh_interval: Duration,
    pub pairing_refresh_delay: Duration,
}

impl ControllerConfig {
    pub fn new(backend_url: Url) -> Self {
        Self {
            backend_url,
            device_name: "Desktop PC".into(),
            timeout: Duration::from_secs(10),
            startup_grace: DEFAULT_STARTUP_GRACE,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            pairing_refresh_delay: DEFAULT_PAIRING_REFRESH_DELAY,
        }
    }
}
