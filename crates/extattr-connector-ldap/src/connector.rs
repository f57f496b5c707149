//! LDAP directory implementation
//!
//! Implements [`LocalDirectory`] for Active Directory computer objects.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ldap3::adapters::{Adapter, EntriesOnly, PagedResults};
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapError, LdapResult, Mod, Scope, SearchEntry};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use extattr_connector::error::{ConnectorError, ConnectorResult};
use extattr_connector::model::LocalObject;
use extattr_connector::operation::SearchScope;
use extattr_connector::slot::SlotIndex;
use extattr_connector::traits::{Connector, LocalDirectory};

use crate::computer::{computer_attributes, computer_name_filter, map_computer_entry};
use crate::config::LdapConfig;

const CONTAINER_FILTER: &str = "(objectClass=organizationalUnit)";

/// Active Directory computer connector.
pub struct LdapDirectory {
    config: LdapConfig,

    display_name: String,

    /// Cached LDAP connection (lazily initialized).
    connection: Arc<RwLock<Option<Ldap>>>,
}

impl LdapDirectory {
    /// Create a new directory connector with the given configuration.
    pub fn new(config: LdapConfig) -> ConnectorResult<Self> {
        config.validate()?;

        let display_name = format!("LDAP: {}", config.host);

        Ok(Self {
            config,
            display_name,
            connection: Arc::new(RwLock::new(None)),
        })
    }

    pub fn config(&self) -> &LdapConfig {
        &self.config
    }

    /// Get an LDAP connection, creating one if necessary.
    async fn get_connection(&self) -> ConnectorResult<Ldap> {
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        let conn = self.create_connection().await?;

        {
            let mut conn_guard = self.connection.write().await;
            *conn_guard = Some(conn.clone());
        }

        Ok(conn)
    }

    /// Drop the cached connection so the next call reconnects.
    async fn invalidate_connection(&self) {
        self.connection.write().await.take();
    }

    async fn create_connection(&self) -> ConnectorResult<Ldap> {
        let url = self.config.url();

        debug!(url = %url, "Connecting to LDAP server");

        let settings = LdapConnSettings::new()
            .set_conn_timeout(Duration::from_secs(self.config.connection_timeout_secs))
            .set_starttls(self.config.use_starttls);

        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &url)
            .await
            .map_err(|e| {
                ConnectorError::connection_failed_with_source(
                    format!("Failed to connect to LDAP server at {url}"),
                    e,
                )
            })?;

        // Spawn the connection driver
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "LDAP connection driver error");
            }
        });

        let bind_dn = &self.config.bind_dn;
        let bind_password = self.config.bind_password.as_deref().unwrap_or("");

        debug!(bind_dn = %bind_dn, "Performing LDAP bind");

        let result = ldap
            .simple_bind(bind_dn, bind_password)
            .await
            .map_err(|e| {
                ConnectorError::connection_failed_with_source(
                    format!("LDAP bind failed for {bind_dn}"),
                    e,
                )
            })?;

        if result.rc != 0 {
            if result.rc == 49 {
                return Err(ConnectorError::AuthenticationFailed);
            }
            return Err(ConnectorError::connection_failed(format!(
                "LDAP bind failed with code {}: {}",
                result.rc, result.text
            )));
        }

        info!(host = %self.config.host, "LDAP connection established");

        Ok(ldap)
    }

    /// Map a client-side error, dropping the connection when it is broken.
    async fn map_ldap_error(&self, error: LdapError, target: &str, operation: &str) -> ConnectorError {
        match error {
            LdapError::LdapResult { result } => map_result_code(&result, target, operation),
            other => {
                self.invalidate_connection().await;
                ConnectorError::network_with_source(
                    format!("LDAP {operation} failed for {target}"),
                    other,
                )
            }
        }
    }

    async fn paged_search(
        &self,
        base: &str,
        scope: Scope,
        filter: &str,
    ) -> ConnectorResult<Vec<LocalObject>> {
        let mut ldap = self.get_connection().await?;

        let page_size = i32::try_from(self.config.page_size).unwrap_or(i32::MAX);
        let adapters: Vec<Box<dyn Adapter<_, _>>> = vec![
            Box::new(EntriesOnly::new()),
            Box::new(PagedResults::new(page_size)),
        ];

        debug!(base = %base, filter = %filter, page_size, "Searching LDAP");

        let mut search = match ldap
            .streaming_search_with(adapters, base, scope, filter, computer_attributes())
            .await
        {
            Ok(search) => search,
            Err(e) => return Err(self.map_ldap_error(e, base, "search").await),
        };

        let mut objects = Vec::new();
        let mut skipped = 0usize;
        loop {
            match search.next().await {
                Ok(Some(entry)) => {
                    let entry = SearchEntry::construct(entry);
                    match map_computer_entry(&entry) {
                        Some(object) => objects.push(object),
                        None => skipped += 1,
                    }
                }
                Ok(None) => break,
                Err(e) => return Err(self.map_ldap_error(e, base, "search").await),
            }
        }

        let result = search.finish().await;
        if result.rc != 0 {
            return Err(map_result_code(&result, base, "search"));
        }

        info!(
            base = %base,
            found = objects.len(),
            skipped,
            "LDAP computer search completed"
        );

        Ok(objects)
    }
}

/// Translate a non-zero LDAP result code.
pub(crate) fn map_result_code(result: &LdapResult, target: &str, operation: &str) -> ConnectorError {
    match result.rc {
        32 => ConnectorError::ObjectNotFound {
            identifier: target.to_string(),
        },
        49 => ConnectorError::AuthenticationFailed,
        50 => ConnectorError::AuthorizationFailed {
            operation: format!("{operation} on {target}"),
        },
        51 | 52 => ConnectorError::TargetUnavailable {
            message: format!("code {}: {}", result.rc, result.text),
        },
        19 | 21 => ConnectorError::ConstraintViolation {
            message: format!("code {}: {}", result.rc, result.text),
        },
        rc => ConnectorError::operation_failed(format!(
            "LDAP {operation} failed with code {rc}: {}",
            result.text
        )),
    }
}

fn to_ldap_scope(scope: SearchScope) -> Scope {
    match scope {
        SearchScope::OneLevel => Scope::OneLevel,
        SearchScope::Subtree => Scope::Subtree,
    }
}

#[async_trait]
impl Connector for LdapDirectory {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    #[instrument(skip(self))]
    async fn test_connection(&self) -> ConnectorResult<()> {
        let mut ldap = self.get_connection().await?;

        let result = ldap
            .search(&self.config.base_dn, Scope::Base, "(objectClass=*)", vec!["dn"])
            .await
            .map_err(|e| ConnectorError::connection_failed_with_source("Test search failed", e))?;

        let (entries, _res) = result.success().map_err(|e| {
            ConnectorError::connection_failed(format!("Test search failed: {e}"))
        })?;

        if entries.is_empty() {
            return Err(ConnectorError::connection_failed(format!(
                "Base DN '{}' not found or not accessible",
                self.config.base_dn
            )));
        }

        info!("LDAP connection test successful");
        Ok(())
    }
}

#[async_trait]
impl LocalDirectory for LdapDirectory {
    #[instrument(skip(self))]
    async fn search_computers(
        &self,
        container: &str,
        scope: SearchScope,
    ) -> ConnectorResult<Vec<LocalObject>> {
        let filter = self.config.computer_filter.clone();
        self.paged_search(container, to_ldap_scope(scope), &filter)
            .await
    }

    /// Searches the whole subtree under `base_dn`; the first entry wins.
    #[instrument(skip(self))]
    async fn find_computer(&self, name: &str) -> ConnectorResult<Option<LocalObject>> {
        let filter = computer_name_filter(&self.config.computer_filter, name);
        let mut objects = self
            .paged_search(&self.config.base_dn, Scope::Subtree, &filter)
            .await?;
        Ok(if objects.is_empty() {
            None
        } else {
            Some(objects.swap_remove(0))
        })
    }

    #[instrument(skip(self, value))]
    async fn write_slot(
        &self,
        distinguished_name: &str,
        slot: SlotIndex,
        value: Option<&str>,
    ) -> ConnectorResult<()> {
        let mut ldap = self.get_connection().await?;

        let values: HashSet<String> = match value {
            Some(v) if !v.is_empty() => std::iter::once(v.to_string()).collect(),
            _ => HashSet::new(),
        };
        let mods = vec![Mod::Replace(slot.attribute_name(), values)];

        let result = match ldap.modify(distinguished_name, mods).await {
            Ok(result) => result,
            Err(e) => return Err(self.map_ldap_error(e, distinguished_name, "modify").await),
        };

        if result.rc != 0 {
            return Err(map_result_code(&result, distinguished_name, "modify"));
        }

        info!(dn = %distinguished_name, attribute = %slot.attribute_name(), "LDAP attribute updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_containers(&self, base: &str) -> ConnectorResult<Vec<String>> {
        let mut ldap = self.get_connection().await?;

        let result = match ldap
            .search(base, Scope::Subtree, CONTAINER_FILTER, vec!["distinguishedName"])
            .await
        {
            Ok(result) => result,
            Err(e) => return Err(self.map_ldap_error(e, base, "search").await),
        };

        let (entries, _res) = match result.success() {
            Ok(ok) => ok,
            Err(e) => return Err(self.map_ldap_error(e, base, "search").await),
        };

        let mut containers: Vec<String> = entries
            .into_iter()
            .map(SearchEntry::construct)
            .map(|entry| entry.dn)
            .filter(|dn| !dn.is_empty())
            .collect();
        containers.sort_by_key(|dn| dn.to_lowercase());

        debug!(base = %base, count = containers.len(), "Listed organizational units");
        Ok(containers)
    }
}

impl std::fmt::Debug for LdapDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapDirectory")
            .field("display_name", &self.display_name)
            .field("config", &self.config)
            .finish()
    }
}
