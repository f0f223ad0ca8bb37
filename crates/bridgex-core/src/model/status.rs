use serde::Serialize;
use strum::Display;

/// Client belief about backend reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize)]
pub enum ConnectionStatus {
    /// No health check has been issued yet.
    #[default]
    Unknown,
    /// A health check is in flight.
    Checking,
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    /// The pairing control is enabled only in this state.
    pub fn pairing_enabled(self) -> bool {
        self == Self::Connected
    }
}

/// Published presence snapshot: status plus what the indicator displays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Presence {
    pub status: ConnectionStatus,
    /// Backend version from the last successful check.
    pub version: Option<String>,
    /// Reason for the last failed check.
    pub last_error: Option<String>,
}

impl Presence {
    pub fn pairing_enabled(&self) -> bool {
        self.status.pairing_enabled()
    }

    /// Indicator text, e.g. `Connected (v0.1.0)`.
    pub fn label(&self) -> String {
        match (self.status, self.version.as_deref()) {
            (ConnectionStatus::Unknown, _) => "Starting...".into(),
            (ConnectionStatus::Checking, _) => "Checking...".into(),
            (ConnectionStatus::Connected, Some(v)) => format!("Connected (v{v})"),
            (ConnectionStatus::Connected, None) => "Connected".into(),
            (ConnectionStatus::Disconnected, _) => "Disconnected".into(),
        }
    }
}
