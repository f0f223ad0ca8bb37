// Health endpoint
//
// Liveness probe used by the presence monitor and the backend supervisor.

use tracing::debug;

use crate::client::BackendClient;
use crate::error::Error;
use crate::models::HealthResponse;

impl BackendClient {
    /// Probe backend liveness.
    ///
    /// `GET /api/v1/health`
    pub async fn health(&self) -> Result<HealthResponse, Error> {
        let url = self.api_url("health")?;
        let health: HealthResponse = self.get(url).await?;
        debug!(version = ?health.version, "backend healthy");
        Ok(health)
    }
}
