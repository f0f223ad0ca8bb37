//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::path::PathBuf;

use bridgex_core::{DirectoryView, Intent, PairingSession, PendingRemoval, Presence};

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Everything the event loop can be asked to do.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ────────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),
    ToggleHelp,

    // ── State published by the controller ────────────────────────────
    PresenceUpdated(Presence),
    DirectoryUpdated(DirectoryView),
    PairingUpdated(Option<PairingSession>),
    RemovalUpdated(Option<PendingRemoval>),

    // ── Intents for the controller ───────────────────────────────────
    Dispatch(Intent),

    // ── Managed backend ──────────────────────────────────────────────
    RestartBackend,

    // ── Send-file prompt ─────────────────────────────────────────────
    OpenSendPrompt { device_id: String, name: String },
    SendPromptInput(String),
    SubmitSendPrompt,
    CloseSendPrompt,

    // ── Feedback ─────────────────────────────────────────────────────
    /// Blocking error dialog; input is captured until acknowledged.
    ShowError(String),
    DismissError,
    Notify(Notification),
}

/// Split a typed path list on commas; blank entries are dropped.
pub fn parse_paths(input: &str) -> Vec<PathBuf> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_split_on_commas() {
        assert_eq!(
            parse_paths(" /tmp/a.txt, /tmp/b.txt ,, "),
            vec![PathBuf::from("/tmp/a.txt"), PathBuf::from("/tmp/b.txt")]
        );
        assert!(parse_paths("   ").is_empty());
    }
}
