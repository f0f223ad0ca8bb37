// ── Backend process supervisor ──
//
// Optionally launches the backend server next to the client, waits for its
// health endpoint to answer, restarts it on request, and kills it when the
// client exits. The
// controller itself never depends on this: it only needs a reachable
// gateway.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::gateway::Gateway;

/// Delay between health probes while waiting for the backend.
pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Pause between killing the backend and launching it again, so the port
/// is released.
pub const RESTART_DELAY: Duration = Duration::from_secs(1);

/// Executable name of the backend server.
pub const BACKEND_BINARY: &str = if cfg!(windows) {
    "bridgex-server.exe"
} else {
    "bridgex-server"
};

/// A backend server spawned by this client.
#[derive(Debug)]
pub struct BackendProcess {
    child: Child,
    binary: PathBuf,
    port: u16,
}

impl BackendProcess {
    /// Spawn `binary` listening on `port`.
    ///
    /// The child's output is discarded and it is killed if this handle is
    /// dropped without calling [`stop()`](Self::stop).
    pub fn spawn(binary: &Path, port: u16) -> Result<Self, CoreError> {
        let child = launch(binary, port)?;
        Ok(Self {
            child,
            binary: binary.to_path_buf(),
            port,
        })
    }

    /// Kill the running backend, wait [`RESTART_DELAY`], launch the same
    /// binary on the same port and wait up to `timeout` for it to be ready.
    ///
    /// If the relaunch fails the old process is already gone; the handle
    /// keeps pointing at it until a later restart succeeds.
    pub async fn restart<G: Gateway>(
        &mut self,
        gateway: &G,
        timeout: Duration,
    ) -> Result<(), CoreError> {
        info!(pid = ?self.child.id(), port = self.port, "restarting backend");
        if let Err(e) = self.child.kill().await {
            warn!(error = %e, "backend did not stop cleanly, relaunching anyway");
        }
        tokio::time::sleep(RESTART_DELAY).await;

        self.child = launch(&self.binary, self.port)?;
        self.wait_ready(gateway, timeout).await
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Poll `gateway` until the backend reports healthy.
    ///
    /// Fails early if the process exits, and with `StartupTimeout` once
    /// `timeout` has elapsed.
    pub async fn wait_ready<G: Gateway>(
        &mut self,
        gateway: &G,
        timeout: Duration,
    ) -> Result<(), CoreError> {
        let child = &mut self.child;
        let probe = async {
            loop {
                if let Some(status) = child.try_wait().map_err(|e| CoreError::Process {
                    message: e.to_string(),
                })? {
                    return Err(CoreError::Process {
                        message: format!("backend exited during startup ({status})"),
                    });
                }
                if gateway.health_check().await.is_ok() {
                    return Ok(());
                }
                tokio::time::sleep(READY_POLL_INTERVAL).await;
            }
        };

        match tokio::time::timeout(timeout, probe).await {
            Ok(result) => {
                if result.is_ok() {
                    info!(port = self.port, "backend ready");
                }
                result
            }
            Err(_) => Err(CoreError::StartupTimeout {
                timeout_secs: timeout.as_secs(),
            }),
        }
    }

    /// Kill the process and reap it.
    pub async fn stop(&mut self) -> Result<(), CoreError> {
        debug!(pid = ?self.child.id(), "stopping backend");
        if let Err(e) = self.child.kill().await {
            warn!(error = %e, "failed to stop backend");
            return Err(CoreError::Process {
                message: e.to_string(),
            });
        }
        info!("backend stopped");
        Ok(())
    }
}

fn launch(binary: &Path, port: u16) -> Result<Child, CoreError> {
    let child = Command::new(binary)
        .env("BRIDGEX_PORT", port.to_string())
        .env("BRIDGEX_AUTO_START", "1")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| CoreError::Process {
            message: format!("failed to start {}: {e}", binary.display()),
        })?;

    info!(binary = %binary.display(), port, pid = ?child.id(), "backend started");
    Ok(child)
}

/// Poll `gateway` until it answers a health check or `timeout` elapses.
///
/// For backends this client did not spawn.
pub async fn wait_until_healthy<G: Gateway>(gateway: &G, timeout: Duration) -> Result<(), CoreError> {
    let probe = async {
        while gateway.health_check().await.is_err() {
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    };
    tokio::time::timeout(timeout, probe)
        .await
        .map_err(|_| CoreError::StartupTimeout {
            timeout_secs: timeout.as_secs(),
        })
}

/// Locate the backend binary: next to the running executable when present,
/// otherwise by name on `PATH`.
pub fn default_binary_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(BACKEND_BINARY)))
        .filter(|candidate| candidate.is_file())
        .unwrap_or_else(|| PathBuf::from(BACKEND_BINARY))
}
