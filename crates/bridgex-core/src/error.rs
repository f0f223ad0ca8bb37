// ── Core error types ──
//
// User-facing errors from bridgex-core. Consumers never see HTTP status
// codes or serde failures directly: `CoreError::from_api` folds every
// transport-level failure into one of two buckets (unreachable vs.
// rejected) tagged with the gateway operation that produced it.

use thiserror::Error;

use crate::gateway::Operation;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    // ── Gateway errors ───────────────────────────────────────────────
    /// Backend unreachable, timed out, or replied with something unreadable.
    #[error("{operation} failed: backend unreachable ({reason})")]
    Transport { operation: Operation, reason: String },

    /// Backend reachable but refused the operation.
    #[error("{operation} rejected: {message}")]
    Rejected { operation: Operation, message: String },

    // ── Interaction guards ───────────────────────────────────────────
    #[error("Pairing is unavailable while the backend is not connected")]
    PairingDisabled,

    #[error("A pairing session is already open")]
    PairingInProgress,

    #[error("No device removal is awaiting confirmation")]
    NoPendingRemoval,

    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("No files selected for transfer")]
    NoFilesSelected,

    // ── Backend process ──────────────────────────────────────────────
    #[error("Backend process error: {message}")]
    Process { message: String },

    #[error("Backend did not become healthy within {timeout_secs}s")]
    StartupTimeout { timeout_secs: u64 },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Translate a transport-layer error raised while running `operation`.
    pub fn from_api(operation: Operation, err: &bridgex_api::Error) -> Self {
        match err {
            bridgex_api::Error::Rejected { message, .. } => Self::Rejected {
                operation,
                message: message.clone(),
            },
            bridgex_api::Error::File { .. } => Self::Rejected {
                operation,
                message: err.to_string(),
            },
            other => Self::Transport {
                operation,
                reason: other.to_string(),
            },
        }
    }

    /// Whether this failure means the backend is unreachable.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// The gateway operation that failed, if this came from the gateway.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Transport { operation, .. } | Self::Rejected { operation, .. } => {
                Some(*operation)
            }
            _ => None,
        }
    }

    /// Detail text without the operation prefix, for inline display.
    pub fn detail(&self) -> String {
        match self {
            Self::Transport { reason, .. } => reason.clone(),
            Self::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
