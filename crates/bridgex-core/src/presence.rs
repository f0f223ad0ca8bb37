// ── Presence monitor ──
//
// Maps health-check outcomes to the connection indicator. Every check takes
// a generation number when issued; a completion whose generation is no
// longer the latest is dropped, so overlapping checks cannot flip the
// indicator back to an older answer.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::gateway::{Gateway, Operation};
use crate::model::{ConnectionStatus, Presence};

pub struct PresenceMonitor {
    state: watch::Sender<Presence>,
    generation: AtomicU64,
}

impl PresenceMonitor {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Presence::default());
        Self {
            state,
            generation: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Presence> {
        self.state.subscribe()
    }

    pub fn current(&self) -> Presence {
        self.state.borrow().clone()
    }

    /// Run one health check and return the status it leaves behind.
    ///
    /// Status is `Checking` as soon as this is called. Failures are logged
    /// and recorded, never returned.
    pub async fn check_health<G: Gateway>(&self, gateway: &G) -> ConnectionStatus {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|p| p.status = ConnectionStatus::Checking);

        let result = gateway.health_check().await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(
                operation = %Operation::HealthCheck,
                generation,
                "discarding superseded health check"
            );
            return self.state.borrow().status;
        }

        let next = match result {
            Ok(health) => {
                debug!(version = ?health.version, service = ?health.service, "backend healthy");
                Presence {
                    status: ConnectionStatus::Connected,
                    version: health.version,
                    last_error: None,
                }
            }
            Err(e) => {
                warn!(operation = %Operation::HealthCheck, error = %e, "backend unreachable");
                Presence {
                    status: ConnectionStatus::Disconnected,
                    version: None,
                    last_error: Some(e.detail()),
                }
            }
        };

        let status = next.status;
        self.state.send_replace(next);
        status
    }
}

impl Default for PresenceMonitor {
    fn default() -> Self {
        Self::new()
    }
}
