//! Entra ID device directory.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use extattr_connector::error::ConnectorResult;
use extattr_connector::model::RemoteDevice;
use extattr_connector::operation::{ChangeSet, DeviceFilter};
use extattr_connector::traits::{Connector, RemoteDirectory};

use crate::devices::{device_query_url, device_url, DeviceUpdateRequest, CONSISTENCY_LEVEL};
use crate::graph_client::ODataResponse;
use crate::{EntraConfig, EntraCredentials, EntraResult, GraphClient, GraphSession};

/// Cloud device directory reached through Microsoft Graph.
///
/// Owns the run's [`GraphSession`]; construct it once and share it behind an
/// `Arc<dyn RemoteDirectory>`.
#[derive(Debug)]
pub struct EntraDeviceDirectory {
    client: GraphClient,
    display_name: String,
}

impl EntraDeviceDirectory {
    /// Acquire a session and build the directory.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built or the session cannot be
    /// acquired. Nothing should be synced in that case.
    #[instrument(skip_all, fields(tenant_id = %config.tenant_id))]
    pub async fn connect(config: EntraConfig, credentials: &EntraCredentials) -> EntraResult<Self> {
        let http_client = GraphClient::http_client(&config)?;
        let session = GraphSession::acquire(&http_client, &config, credentials).await?;
        Ok(Self::with_session(http_client, &config, session))
    }

    /// Build the directory around an existing session.
    pub fn with_session(
        http_client: reqwest::Client,
        config: &EntraConfig,
        session: GraphSession,
    ) -> Self {
        Self {
            display_name: format!("Entra ID: {}", session.tenant_id()),
            client: GraphClient::new(http_client, config, session),
        }
    }

    /// Acquire a new session and use it for all later calls.
    pub async fn reauthenticate(
        &self,
        config: &EntraConfig,
        credentials: &EntraCredentials,
    ) -> EntraResult<()> {
        let session =
            GraphSession::acquire(self.client.http(), config, credentials).await?;
        self.client.replace_session(session).await;
        info!("Graph session replaced");
        Ok(())
    }

    pub fn client(&self) -> &GraphClient {
        &self.client
    }
}

#[async_trait]
impl Connector for EntraDeviceDirectory {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    #[instrument(skip(self))]
    async fn test_connection(&self) -> ConnectorResult<()> {
        let url = format!("{}/devices?$select=id&$top=1", self.client.base_url());
        let _: ODataResponse<serde_json::Value> = self.client.get(&url, &[]).await?;
        info!("Graph connection test successful");
        Ok(())
    }
}

#[async_trait]
impl RemoteDirectory for EntraDeviceDirectory {
    #[instrument(skip(self))]
    async fn find_devices(
        &self,
        filter: &DeviceFilter,
        limit: usize,
    ) -> ConnectorResult<Vec<RemoteDevice>> {
        let url = device_query_url(self.client.base_url(), filter, limit);
        let response: ODataResponse<RemoteDevice> =
            self.client.get(&url, &[CONSISTENCY_LEVEL]).await?;

        let mut devices = response.value;
        devices.truncate(limit.max(1));

        debug!(found = devices.len(), "Device query completed");
        Ok(devices)
    }

    #[instrument(skip(self, changes), fields(slots = changes.len()))]
    async fn update_device(&self, device_id: &str, changes: &ChangeSet) -> ConnectorResult<()> {
        let url = device_url(self.client.base_url(), device_id);
        let body = DeviceUpdateRequest {
            extension_attributes: changes,
        };
        self.client.patch_no_content(&url, &body).await?;

        info!(device_id = %device_id, "Device extension attributes updated");
        Ok(())
    }
}
