//! Connector capability traits.
//!
//! The sync engine never talks to LDAP or Graph directly; it holds these
//! traits behind `Arc<dyn ...>` so tests can swap in in-memory directories.

use async_trait::async_trait;

use crate::error::ConnectorResult;
use crate::model::{LocalObject, RemoteDevice};
use crate::operation::{ChangeSet, DeviceFilter, SearchScope};
use crate::slot::SlotIndex;

/// Base trait for all connectors.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Get the display name for this connector instance.
    fn display_name(&self) -> &str;

    /// Test the connection to the target system.
    ///
    /// Returns `Ok(())` if the connection is successful, or an error describing
    /// what went wrong.
    async fn test_connection(&self) -> ConnectorResult<()>;
}

/// The on-premises directory holding computer objects.
#[async_trait]
pub trait LocalDirectory: Connector {
    /// Read every computer object under `container` with all fifteen slots.
    ///
    /// # Arguments
    /// * `container` - Distinguished name of the container to search
    /// * `scope` - One level or full subtree
    async fn search_computers(
        &self,
        container: &str,
        scope: SearchScope,
    ) -> ConnectorResult<Vec<LocalObject>>;

    /// Find one computer by name or account name anywhere in the directory.
    async fn find_computer(&self, name: &str) -> ConnectorResult<Option<LocalObject>>;

    /// Replace one slot on one object. `None` removes every value.
    async fn write_slot(
        &self,
        distinguished_name: &str,
        slot: SlotIndex,
        value: Option<&str>,
    ) -> ConnectorResult<()>;

    /// Distinguished names of organizational units below `base`, sorted.
    async fn list_containers(&self, base: &str) -> ConnectorResult<Vec<String>>;
}

/// The cloud directory holding device objects.
#[async_trait]
pub trait RemoteDirectory: Connector {
    /// Find devices matching `filter`.
    ///
    /// Implementations return at most `limit` devices in the directory's own
    /// order.
    async fn find_devices(
        &self,
        filter: &DeviceFilter,
        limit: usize,
    ) -> ConnectorResult<Vec<RemoteDevice>>;

    /// Apply every change in `changes` to one device in a single call.
    async fn update_device(&self, device_id: &str, changes: &ChangeSet) -> ConnectorResult<()>;
}
