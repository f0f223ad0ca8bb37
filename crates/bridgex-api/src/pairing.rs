// Pairing endpoint

use tracing::{debug, info};

use crate::client::BackendClient;
use crate::error::Error;
use crate::models::{PairRequest, PairResponse};

impl BackendClient {
    /// Open a pairing session announcing this machine as `device_name`.
    ///
    /// `POST /api/v1/pair` with `{"device_name": "..."}`
    pub async fn pair(&self, device_name: &str) -> Result<PairResponse, Error> {
        let url = self.api_url("pair")?;
        debug!(device_name, "requesting pairing session");
        let resp: PairResponse = self
            .post(
                url,
                &PairRequest {
                    device_name: device_name.to_owned(),
                },
            )
            .await?;
        info!(
            device_id = resp.device_id.as_deref().unwrap_or("<none>"),
            has_qr = resp.qr_data.is_some(),
            "pairing session opened"
        );
        Ok(resp)
    }
}
