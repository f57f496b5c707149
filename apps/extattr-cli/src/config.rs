//! Configuration file loading
//!
//! Non-secret settings come from a YAML file. The LDAP bind password and the
//! Graph client secret are read only from the environment.

use std::path::Path;
use std::time::Duration;

use extattr_connector::resilience::RetryConfig;
use extattr_connector_entra::{EntraCloudEnvironment, EntraConfig, EntraCredentials};
use extattr_connector_ldap::LdapConfig;
use extattr_sync::DEFAULT_WORKER_COUNT;
use serde::Deserialize;

use crate::error::{CliError, CliResult};

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "extattr.yaml";

pub const LDAP_PASSWORD_VAR: &str = "EXTATTR_LDAP_BIND_PASSWORD";
pub const CLIENT_SECRET_VAR: &str = "EXTATTR_ENTRA_CLIENT_SECRET";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub ldap: LdapConfig,
    pub entra: EntraSection,
    /// Containers to sync when none are given on the command line.
    #[serde(default)]
    pub containers: Vec<String>,
    #[serde(default)]
    pub sync: SyncSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntraSection {
    pub tenant_id: String,
    pub client_id: String,
    #[serde(default)]
    pub cloud: EntraCloudEnvironment,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub retry: RetrySection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrySection {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetrySection {
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            ..RetryConfig::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncSection {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_recursive")]
    pub recursive: bool,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            recursive: default_recursive(),
        }
    }
}

fn default_api_version() -> String {
    "v1.0".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_workers() -> usize {
    DEFAULT_WORKER_COUNT
}

fn default_recursive() -> bool {
    true
}

/// Secrets resolved from the environment.
#[derive(Clone, Default)]
pub struct Secrets {
    pub ldap_bind_password: Option<String>,
    pub entra_client_secret: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |s: &Option<String>| s.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Secrets")
            .field("ldap_bind_password", &redact(&self.ldap_bind_password))
            .field("entra_client_secret", &redact(&self.entra_client_secret))
            .finish()
    }
}

impl Secrets {
    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Resolve secrets from a custom variable reader.
    ///
    /// Tests supply variables this way without touching the process
    /// environment. Empty values count as absent.
    pub fn from_reader<F>(reader: F) -> Self
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let read = |key: &str| reader(key).ok().filter(|v| !v.is_empty());
        Self {
            ldap_bind_password: read(LDAP_PASSWORD_VAR),
            entra_client_secret: read(CLIENT_SECRET_VAR),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> CliResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            CliError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(content: &str) -> CliResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| CliError::Config(format!("Failed to parse config: {e}")))
    }

    /// LDAP settings with the bind password applied and validated.
    pub fn ldap_config(&self, secrets: &Secrets) -> CliResult<LdapConfig> {
        let password = secrets.ldap_bind_password.as_deref().ok_or_else(|| {
            CliError::Config(format!("{LDAP_PASSWORD_VAR} is not set"))
        })?;

        let config = self.ldap.clone().with_password(password);
        config.validate()?;
        Ok(config)
    }

    pub fn entra_config(&self) -> CliResult<EntraConfig> {
        Ok(EntraConfig::builder()
            .tenant_id(&self.entra.tenant_id)
            .cloud_environment(self.entra.cloud)
            .api_version(&self.entra.api_version)
            .retry(self.entra.retry.to_retry_config())
            .build()?)
    }

    pub fn entra_credentials(&self, secrets: &Secrets) -> CliResult<EntraCredentials> {
        if self.entra.client_id.trim().is_empty() {
            return Err(CliError::Config("entra.client_id is required".to_string()));
        }
        let secret = secrets.entra_client_secret.as_deref().ok_or_else(|| {
            CliError::Config(format!("{CLIENT_SECRET_VAR} is not set"))
        })?;
        Ok(EntraCredentials::new(&self.entra.client_id, secret))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const SAMPLE: &str = r#"
ldap:
  host: dc01.corp.example
  base_dn: DC=corp,DC=example
  bind_dn: CN=svc-extattr,OU=Service,DC=corp,DC=example
  use_ssl: true
  port: 636
entra:
  tenant_id: 00000000-0000-0000-0000-000000000001
  client_id: 11111111-0000-0000-0000-000000000002
  cloud: us_government
containers:
  - OU=Workstations,DC=corp,DC=example
sync:
  workers: 8
"#;

    fn reader(
        vars: &[(&str, &str)],
    ) -> impl Fn(&str) -> Result<String, std::env::VarError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned().ok_or(std::env::VarError::NotPresent)
    }

    #[test]
    fn test_parse_full_config() {
        let config = AppConfig::from_yaml(SAMPLE).unwrap();

        assert_eq!(config.ldap.host, "dc01.corp.example");
        assert_eq!(config.ldap.port, 636);
        assert!(config.ldap.use_ssl);
        assert_eq!(config.ldap.page_size, 500);
        assert_eq!(config.entra.cloud, EntraCloudEnvironment::UsGovernment);
        assert_eq!(config.entra.api_version, "v1.0");
        assert_eq!(config.entra.retry.max_retries, 3);
        assert_eq!(config.containers.len(), 1);
        assert_eq!(config.sync.workers, 8);
        assert!(config.sync.recursive);
    }

    #[test]
    fn test_defaults_for_optional_sections() {
        let yaml = r#"
ldap:
  host: dc01
  base_dn: DC=corp,DC=example
  bind_dn: CN=svc,DC=corp,DC=example
entra:
  tenant_id: t
  client_id: c
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert!(config.containers.is_empty());
        assert_eq!(config.sync.workers, DEFAULT_WORKER_COUNT);
        assert_eq!(config.entra.cloud, EntraCloudEnvironment::Commercial);
    }

    #[test]
    fn test_password_in_yaml_is_ignored() {
        let yaml = SAMPLE.replace(
            "  bind_dn:",
            "  bind_password: from-file\n  bind_dn:",
        );
        let config = AppConfig::from_yaml(&yaml).unwrap();
        assert!(config.ldap.bind_password.is_none());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = AppConfig::from_yaml("ldap: [").unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.entra.client_id, "11111111-0000-0000-0000-000000000002");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::from_file(dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("absent.yaml"));
    }

    #[test]
    fn test_secrets_from_reader() {
        let secrets = Secrets::from_reader(reader(&[
            (LDAP_PASSWORD_VAR, "hunter2"),
            (CLIENT_SECRET_VAR, ""),
        ]));
        assert_eq!(secrets.ldap_bind_password.as_deref(), Some("hunter2"));
        assert!(secrets.entra_client_secret.is_none());

        let debug = format!("{secrets:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_ldap_config_requires_password() {
        let config = AppConfig::from_yaml(SAMPLE).unwrap();

        let missing = config.ldap_config(&Secrets::default());
        assert!(matches!(missing, Err(CliError::Config(m)) if m.contains(LDAP_PASSWORD_VAR)));

        let secrets = Secrets::from_reader(reader(&[(LDAP_PASSWORD_VAR, "pw")]));
        let ldap = config.ldap_config(&secrets).unwrap();
        assert_eq!(ldap.bind_password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_entra_config_and_credentials() {
        let config = AppConfig::from_yaml(SAMPLE).unwrap();

        let entra = config.entra_config().unwrap();
        assert!(entra.graph_endpoint().contains("graph.microsoft.us"));

        assert!(config.entra_credentials(&Secrets::default()).is_err());
        let secrets = Secrets::from_reader(reader(&[(CLIENT_SECRET_VAR, "s3cret")]));
        assert!(config.entra_credentials(&secrets).is_ok());
    }
}
