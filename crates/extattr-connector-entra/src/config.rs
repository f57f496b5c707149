//! Configuration for the Entra ID device connector.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use extattr_connector::resilience::RetryConfig;

use crate::{EntraError, EntraResult};

/// Microsoft cloud the tenant lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntraCloudEnvironment {
    #[default]
    Commercial,
    UsGovernment,
    China,
}

impl EntraCloudEnvironment {
    /// OAuth2 authority host.
    #[must_use]
    pub fn login_endpoint(&self) -> &'static str {
        match self {
            Self::Commercial => "https://login.microsoftonline.com",
            Self::UsGovernment => "https://login.microsoftonline.us",
            Self::China => "https://login.chinacloudapi.cn",
        }
    }

    /// Microsoft Graph host.
    #[must_use]
    pub fn graph_endpoint(&self) -> &'static str {
        match self {
            Self::Commercial => "https://graph.microsoft.com",
            Self::UsGovernment => "https://graph.microsoft.us",
            Self::China => "https://microsoftgraph.chinacloudapi.cn",
        }
    }
}

/// App registration credentials for the client-credentials flow.
#[derive(Debug, Clone)]
pub struct EntraCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl EntraCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
        }
    }
}

/// Connector configuration. Build with [`EntraConfig::builder`].
#[derive(Debug, Clone)]
pub struct EntraConfig {
    pub tenant_id: String,
    pub cloud_environment: EntraCloudEnvironment,
    pub api_version: String,
    /// Replaces the cloud's Graph host, e.g. for a mock server.
    pub graph_endpoint_override: Option<String>,
    /// Replaces the cloud's login host.
    pub login_endpoint_override: Option<String>,
    pub request_timeout: Duration,
    pub retry: RetryConfig,
}

impl EntraConfig {
    #[must_use]
    pub fn builder() -> EntraConfigBuilder {
        EntraConfigBuilder::default()
    }

    /// Graph host without trailing slash.
    #[must_use]
    pub fn graph_endpoint(&self) -> &str {
        self.graph_endpoint_override
            .as_deref()
            .unwrap_or_else(|| self.cloud_environment.graph_endpoint())
            .trim_end_matches('/')
    }

    /// Login host without trailing slash.
    #[must_use]
    pub fn login_endpoint(&self) -> &str {
        self.login_endpoint_override
            .as_deref()
            .unwrap_or_else(|| self.cloud_environment.login_endpoint())
            .trim_end_matches('/')
    }

    /// Versioned Graph base URL, e.g. `https://graph.microsoft.com/v1.0`.
    #[must_use]
    pub fn graph_base_url(&self) -> String {
        format!("{}/{}", self.graph_endpoint(), self.api_version)
    }

    /// OAuth2 token endpoint for the tenant.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.login_endpoint(), self.tenant_id)
    }

    /// Scope requested for application permissions. Always the real cloud
    /// host, even when the endpoint is overridden.
    #[must_use]
    pub fn scope(&self) -> String {
        format!("{}/.default", self.cloud_environment.graph_endpoint())
    }
}

/// Builder for [`EntraConfig`].
#[derive(Debug, Clone, Default)]
pub struct EntraConfigBuilder {
    tenant_id: Option<String>,
    cloud_environment: EntraCloudEnvironment,
    api_version: Option<String>,
    graph_endpoint_override: Option<String>,
    login_endpoint_override: Option<String>,
    request_timeout: Option<Duration>,
    retry: Option<RetryConfig>,
}

impl EntraConfigBuilder {
    #[must_use]
    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    #[must_use]
    pub fn cloud_environment(mut self, cloud: EntraCloudEnvironment) -> Self {
        self.cloud_environment = cloud;
        self
    }

    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn graph_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.graph_endpoint_override = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn login_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.login_endpoint_override = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// Returns [`EntraError::Config`] when the tenant is missing or an
    /// endpoint override is not an absolute URL.
    pub fn build(self) -> EntraResult<EntraConfig> {
        let tenant_id = self
            .tenant_id
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| EntraError::Config("tenant_id is required".to_string()))?;

        for endpoint in [&self.graph_endpoint_override, &self.login_endpoint_override]
            .into_iter()
            .flatten()
        {
            let url = Url::parse(endpoint)?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(EntraError::Config(format!(
                    "endpoint must be http or https: {endpoint}"
                )));
            }
        }

        let api_version = self.api_version.unwrap_or_else(|| "v1.0".to_string());
        if api_version.trim().is_empty() {
            return Err(EntraError::Config("api_version must not be empty".to_string()));
        }

        Ok(EntraConfig {
            tenant_id,
            cloud_environment: self.cloud_environment,
            api_version,
            graph_endpoint_override: self.graph_endpoint_override,
            login_endpoint_override: self.login_endpoint_override,
            request_timeout: self.request_timeout.unwrap_or(Duration::from_secs(30)),
            retry: self.retry.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = EntraConfig::builder().tenant_id("contoso").build().unwrap();
        assert_eq!(config.api_version, "v1.0");
        assert_eq!(config.cloud_environment, EntraCloudEnvironment::Commercial);
        assert_eq!(config.graph_base_url(), "https://graph.microsoft.com/v1.0");
        assert_eq!(
            config.token_url(),
            "https://login.microsoftonline.com/contoso/oauth2/v2.0/token"
        );
        assert_eq!(config.scope(), "https://graph.microsoft.com/.default");
        assert_eq!(config.retry, RetryConfig::default());
    }

    #[test]
    fn test_builder_requires_tenant() {
        assert!(matches!(
            EntraConfig::builder().build(),
            Err(EntraError::Config(_))
        ));
        assert!(EntraConfig::builder().tenant_id("  ").build().is_err());
    }

    #[test]
    fn test_endpoint_overrides() {
        let config = EntraConfig::builder()
            .tenant_id("contoso")
            .cloud_environment(EntraCloudEnvironment::UsGovernment)
            .graph_endpoint("http://127.0.0.1:8080/")
            .login_endpoint("http://127.0.0.1:8080")
            .build()
            .unwrap();

        assert_eq!(config.graph_base_url(), "http://127.0.0.1:8080/v1.0");
        assert_eq!(
            config.token_url(),
            "http://127.0.0.1:8080/contoso/oauth2/v2.0/token"
        );
        assert_eq!(config.scope(), "https://graph.microsoft.us/.default");
    }

    #[test]
    fn test_invalid_override_rejected() {
        let result = EntraConfig::builder()
            .tenant_id("contoso")
            .graph_endpoint("not a url")
            .build();
        assert!(matches!(result, Err(EntraError::Url(_))));

        let result = EntraConfig::builder()
            .tenant_id("contoso")
            .graph_endpoint("ftp://example.com")
            .build();
        assert!(matches!(result, Err(EntraError::Config(_))));
    }

    #[test]
    fn test_cloud_endpoints() {
        let china = EntraCloudEnvironment::China;
        assert_eq!(china.login_endpoint(), "https://login.chinacloudapi.cn");
        assert_eq!(
            china.graph_endpoint(),
            "https://microsoftgraph.chinacloudapi.cn"
        );
    }

    #[test]
    fn test_cloud_deserialize() {
        let cloud: EntraCloudEnvironment = serde_json::from_str("\"us_government\"").unwrap();
        assert_eq!(cloud, EntraCloudEnvironment::UsGovernment);
    }

    #[test]
    fn test_credentials_debug_hides_secret() {
        let credentials = EntraCredentials::new("app-id", "very-secret-value");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("app-id"));
        assert!(!debug.contains("very-secret-value"));
    }
}
