// ── Backend gateway ──
//
// The abstract boundary between the client state machine and the backend
// service. The controller is generic over `Gateway` so the state machine
// runs unchanged against the HTTP client or an in-memory double.

use std::future::Future;
use std::path::PathBuf;

use serde::Serialize;
use strum::Display;
use tracing::warn;

use bridgex_api::{BackendClient, DeviceRecord, HealthResponse, PairResponse};

use crate::error::CoreError;
use crate::model::TransferHandle;

/// Gateway operation names, used to tag errors and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    HealthCheck,
    ListDevices,
    StartPairing,
    RemoveDevice,
    SendFile,
}

/// Request/response operations the backend offers the client.
pub trait Gateway: Send + Sync + 'static {
    fn health_check(&self) -> impl Future<Output = Result<HealthResponse, CoreError>> + Send;

    /// Raw device records in backend order, not yet normalized.
    fn list_devices(&self) -> impl Future<Output = Result<Vec<DeviceRecord>, CoreError>> + Send;

    fn start_pairing(
        &self,
        device_name: &str,
    ) -> impl Future<Output = Result<PairResponse, CoreError>> + Send;

    fn remove_device(&self, device_id: &str) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn send_file(
        &self,
        device_id: &str,
        file_paths: &[PathBuf],
    ) -> impl Future<Output = Result<TransferHandle, CoreError>> + Send;
}

impl Gateway for BackendClient {
    async fn health_check(&self) -> Result<HealthResponse, CoreError> {
        self.health()
            .await
            .map_err(|e| CoreError::from_api(Operation::HealthCheck, &e))
    }

    async fn list_devices(&self) -> Result<Vec<DeviceRecord>, CoreError> {
        BackendClient::list_devices(self)
            .await
            .map_err(|e| CoreError::from_api(Operation::ListDevices, &e))
    }

    async fn start_pairing(&self, device_name: &str) -> Result<PairResponse, CoreError> {
        self.pair(device_name)
            .await
            .map_err(|e| CoreError::from_api(Operation::StartPairing, &e))
    }

    async fn remove_device(&self, device_id: &str) -> Result<(), CoreError> {
        BackendClient::remove_device(self, device_id)
            .await
            .map_err(|e| CoreError::from_api(Operation::RemoveDevice, &e))
    }

    async fn send_file(
        &self,
        device_id: &str,
        file_paths: &[PathBuf],
    ) -> Result<TransferHandle, CoreError> {
        let mut handle = TransferHandle {
            device_id: device_id.to_owned(),
            files: Vec::with_capacity(file_paths.len()),
        };

        // One file at a time, in selection order.
        for path in file_paths {
            match BackendClient::send_file(self, device_id, path).await {
                Ok(file) => handle.files.push(file),
                Err(e) => {
                    warn!(
                        device_id,
                        path = %path.display(),
                        sent = handle.files.len(),
                        error = %e,
                        "file transfer failed"
                    );
                    return Err(CoreError::from_api(Operation::SendFile, &e));
                }
            }
        }

        Ok(handle)
    }
}
