//! In-memory directories for sync engine tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use extattr_connector::error::{ConnectorError, ConnectorResult};
use extattr_connector::model::{LocalObject, RemoteDevice};
use extattr_connector::operation::{ChangeSet, DeviceFilter, SearchScope};
use extattr_connector::slot::{AttributeSlots, SlotIndex};
use extattr_connector::traits::{Connector, LocalDirectory, RemoteDirectory};

pub fn slot(n: u8) -> SlotIndex {
    SlotIndex::new(n).unwrap()
}

/// Test data factory for computer objects.
pub fn computer(account_name: &str, values: &[(u8, &str)]) -> LocalObject {
    let name = account_name.trim_end_matches('$');
    let mut slots = AttributeSlots::new();
    for (n, value) in values {
        slots.set(slot(*n), Some((*value).to_string()));
    }
    LocalObject::new(
        format!("CN={name},OU=Workstations,DC=corp,DC=example"),
        name,
        account_name,
    )
    .with_slots(slots)
}

/// Remote directory backed by a device list.
#[derive(Default)]
pub struct FakeRemoteDirectory {
    devices: Vec<RemoteDevice>,
    fail_queries: bool,
    fail_sid_queries: bool,
    failing_updates: HashSet<String>,
    update_delay: Option<Duration>,
    on_update: Option<Box<dyn Fn() + Send + Sync>>,
    pub queries: Mutex<Vec<DeviceFilter>>,
    pub updates: Mutex<Vec<(String, ChangeSet)>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeRemoteDirectory {
    pub fn new(devices: Vec<RemoteDevice>) -> Self {
        Self {
            devices,
            ..Self::default()
        }
    }

    /// Every query fails with a transient error.
    pub fn with_failing_queries(mut self) -> Self {
        self.fail_queries = true;
        self
    }

    /// Security identifier queries fail; display name queries work.
    pub fn with_failing_sid_queries(mut self) -> Self {
        self.fail_sid_queries = true;
        self
    }

    /// Updates to this device id are rejected.
    pub fn with_failing_update(mut self, device_id: &str) -> Self {
        self.failing_updates.insert(device_id.to_string());
        self
    }

    pub fn with_update_delay(mut self, delay: Duration) -> Self {
        self.update_delay = Some(delay);
        self
    }

    /// Runs `hook` inside every update call.
    pub fn with_update_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_update = Some(Box::new(hook));
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    pub fn updates_for(&self, device_id: &str) -> Vec<ChangeSet> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == device_id)
            .map(|(_, changes)| changes.clone())
            .collect()
    }
}

#[async_trait]
impl Connector for FakeRemoteDirectory {
    fn display_name(&self) -> &str {
        "fake remote"
    }

    async fn test_connection(&self) -> ConnectorResult<()> {
        Ok(())
    }
}

#[async_trait]
impl RemoteDirectory for FakeRemoteDirectory {
    async fn find_devices(
        &self,
        filter: &DeviceFilter,
        limit: usize,
    ) -> ConnectorResult<Vec<RemoteDevice>> {
        self.queries.lock().unwrap().push(filter.clone());

        let sid_query = matches!(filter, DeviceFilter::SecurityIdentifier(_));
        if self.fail_queries || (sid_query && self.fail_sid_queries) {
            return Err(ConnectorError::TargetUnavailable {
                message: "service unavailable".to_string(),
            });
        }

        Ok(self
            .devices
            .iter()
            .filter(|device| match filter {
                DeviceFilter::SecurityIdentifier(sid) => {
                    device.security_identifier.as_deref() == Some(sid.as_str())
                }
                DeviceFilter::DisplayName(name) => device.display_name == *name,
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update_device(&self, device_id: &str, changes: &ChangeSet) -> ConnectorResult<()> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(hook) = &self.on_update {
            hook();
        }
        if let Some(delay) = self.update_delay {
            tokio::time::sleep(delay).await;
        }

        self.updates
            .lock()
            .unwrap()
            .push((device_id.to_string(), changes.clone()));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_updates.contains(device_id) {
            return Err(ConnectorError::AuthorizationFailed {
                operation: format!("update device {device_id}"),
            });
        }
        Ok(())
    }
}

/// Local directory backed by per-container object lists.
#[derive(Default)]
pub struct FakeLocalDirectory {
    containers: HashMap<String, Vec<LocalObject>>,
    failing_containers: HashSet<String>,
    denied_targets: HashSet<String>,
    pub searches: Mutex<Vec<(String, SearchScope)>>,
    pub writes: Mutex<Vec<(String, SlotIndex, Option<String>)>>,
}

impl FakeLocalDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(mut self, dn: &str, objects: Vec<LocalObject>) -> Self {
        self.containers.insert(dn.to_string(), objects);
        self
    }

    pub fn with_failing_container(mut self, dn: &str) -> Self {
        self.failing_containers.insert(dn.to_string());
        self
    }

    pub fn with_denied_target(mut self, dn: &str) -> Self {
        self.denied_targets.insert(dn.to_string());
        self
    }

    fn known(&self, dn: &str) -> bool {
        self.containers
            .values()
            .flatten()
            .any(|o| o.distinguished_name == dn)
    }
}

#[async_trait]
impl Connector for FakeLocalDirectory {
    fn display_name(&self) -> &str {
        "fake local"
    }

    async fn test_connection(&self) -> ConnectorResult<()> {
        Ok(())
    }
}

#[async_trait]
impl LocalDirectory for FakeLocalDirectory {
    async fn search_computers(
        &self,
        container: &str,
        scope: SearchScope,
    ) -> ConnectorResult<Vec<LocalObject>> {
        self.searches
            .lock()
            .unwrap()
            .push((container.to_string(), scope));

        if self.failing_containers.contains(container) {
            return Err(ConnectorError::ObjectNotFound {
                identifier: container.to_string(),
            });
        }
        Ok(self.containers.get(container).cloned().unwrap_or_default())
    }

    async fn find_computer(&self, name: &str) -> ConnectorResult<Option<LocalObject>> {
        let stripped = name.trim_end_matches('$');
        Ok(self
            .containers
            .values()
            .flatten()
            .find(|o| o.name == stripped || o.account_name.trim_end_matches('$') == stripped)
            .cloned())
    }

    async fn write_slot(
        &self,
        distinguished_name: &str,
        slot: SlotIndex,
        value: Option<&str>,
    ) -> ConnectorResult<()> {
        if self.denied_targets.contains(distinguished_name) {
            return Err(ConnectorError::AuthorizationFailed {
                operation: format!("modify {distinguished_name}"),
            });
        }
        if !self.known(distinguished_name) {
            return Err(ConnectorError::ObjectNotFound {
                identifier: distinguished_name.to_string(),
            });
        }
        self.writes.lock().unwrap().push((
            distinguished_name.to_string(),
            slot,
            value.map(str::to_string),
        ));
        Ok(())
    }

    async fn list_containers(&self, _base: &str) -> ConnectorResult<Vec<String>> {
        let mut names: Vec<String> = self.containers.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

pub fn remote(directory: FakeRemoteDirectory) -> Arc<FakeRemoteDirectory> {
    Arc::new(directory)
}
