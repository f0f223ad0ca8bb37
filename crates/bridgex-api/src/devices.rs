// Paired-device endpoints

use tracing::debug;

use crate::client::BackendClient;
use crate::error::Error;
use crate::models::DeviceRecord;

impl BackendClient {
    /// List paired devices in backend order.
    ///
    /// `GET /api/v1/devices`
    pub async fn list_devices(&self) -> Result<Vec<DeviceRecord>, Error> {
        let url = self.api_url("devices")?;
        let devices: Vec<DeviceRecord> = self.get(url).await?;
        debug!(count = devices.len(), "listed devices");
        Ok(devices)
    }

    /// Unpair a device.
    ///
    /// `DELETE /api/v1/devices/{id}`, with the id percent-encoded as a
    /// single path segment.
    pub async fn remove_device(&self, device_id: &str) -> Result<(), Error> {
        let mut url = self.api_url("devices")?;
        url.path_segments_mut()
            .map_err(|()| Error::Build("backend URL cannot carry a path".into()))?
            .push(device_id);
        debug!(device_id, "removing device");
        self.delete(url).await
    }
}
