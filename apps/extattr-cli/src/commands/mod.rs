//! Command implementations
//!
//! Every command loads the configuration and opens the directories it needs
//! before touching any object. A failed bind or session acquisition aborts
//! the command.

use std::sync::Arc;

use extattr_connector::traits::Connector;
use extattr_connector_entra::EntraDeviceDirectory;
use extattr_connector_ldap::LdapDirectory;
use tracing::info;

use crate::config::{AppConfig, Secrets};
use crate::error::CliResult;

pub mod check;
pub mod containers;
pub mod set;
pub mod sync;

/// Loaded configuration plus resolved secrets.
#[derive(Debug)]
pub struct Context {
    pub config: AppConfig,
    pub secrets: Secrets,
}

impl Context {
    pub fn new(config: AppConfig, secrets: Secrets) -> Self {
        Self { config, secrets }
    }

    /// Bind to the local directory and verify the base DN is readable.
    pub async fn connect_ldap(&self) -> CliResult<Arc<LdapDirectory>> {
        let directory = LdapDirectory::new(self.config.ldap_config(&self.secrets)?)?;
        directory.test_connection().await?;
        info!(directory = directory.display_name(), "Connected");
        Ok(Arc::new(directory))
    }

    /// Acquire the Graph session for this run.
    pub async fn connect_entra(&self) -> CliResult<Arc<EntraDeviceDirectory>> {
        let config = self.config.entra_config()?;
        let credentials = self.config.entra_credentials(&self.secrets)?;
        let directory = EntraDeviceDirectory::connect(config, &credentials).await?;
        info!(directory = directory.display_name(), "Session acquired");
        Ok(Arc::new(directory))
    }
}
