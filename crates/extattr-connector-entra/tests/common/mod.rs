//! Common test utilities for extattr-connector-entra integration tests.

#![cfg(feature = "integration")]
#![allow(dead_code)]

use std::time::Duration;

use extattr_connector::resilience::RetryConfig;
use extattr_connector_entra::{EntraConfig, EntraCredentials, EntraDeviceDirectory};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TENANT_ID: &str = "test-tenant";

/// Test data factory for Entra devices.
pub fn create_test_device(id: &str, display_name: &str, sid: Option<&str>) -> Value {
    json!({
        "id": id,
        "displayName": display_name,
        "onPremisesSecurityIdentifier": sid
    })
}

/// Wraps items in an OData collection response.
pub fn create_odata_response(items: Vec<Value>) -> Value {
    json!({
        "@odata.count": items.len(),
        "value": items
    })
}

/// Creates an OData error response.
pub fn create_odata_error(code: &str, message: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message
        }
    })
}

/// Creates a mock OAuth token response.
pub fn create_token_response(access_token: &str, expires_in: u64) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": expires_in
    })
}

/// Retry policy with millisecond delays.
pub fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig {
        max_retries,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        backoff_multiplier: 2.0,
        jitter: false,
    }
}

pub fn test_credentials() -> EntraCredentials {
    EntraCredentials::new("test-client-id", "test-client-secret")
}

/// Mock server wrapper with common setup helpers.
pub struct MockGraphServer {
    pub server: MockServer,
}

impl MockGraphServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Configuration pointing both login and Graph at the mock server.
    pub fn config(&self, retry: RetryConfig) -> EntraConfig {
        EntraConfig::builder()
            .tenant_id(TENANT_ID)
            .graph_endpoint(self.url())
            .login_endpoint(self.url())
            .retry(retry)
            .build()
            .expect("valid test config")
    }

    /// Sets up the OAuth token endpoint.
    pub async fn mock_token_endpoint(&self) {
        Mock::given(method("POST"))
            .and(path(format!("/{TENANT_ID}/oauth2/v2.0/token")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_token_response("mock-access-token", 3600)),
            )
            .mount(&self.server)
            .await;
    }

    /// Token endpoint, then a connected directory.
    pub async fn connect(&self, retry: RetryConfig) -> EntraDeviceDirectory {
        self.mock_token_endpoint().await;
        EntraDeviceDirectory::connect(self.config(retry), &test_credentials())
            .await
            .expect("session acquired")
    }
}
