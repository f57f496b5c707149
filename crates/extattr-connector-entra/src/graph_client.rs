//! Microsoft Graph API HTTP client with retry handling.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use extattr_connector::resilience::RetryExecutor;

use crate::{EntraConfig, EntraError, EntraResult, GraphSession};

/// `OData` error response from Microsoft Graph.
#[derive(Debug, Deserialize)]
pub struct ODataError {
    pub error: ODataErrorBody,
}

/// `OData` error body.
#[derive(Debug, Deserialize)]
pub struct ODataErrorBody {
    pub code: String,
    pub message: String,
    #[serde(rename = "innerError")]
    pub inner_error: Option<serde_json::Value>,
}

/// Response wrapper for collection responses.
#[derive(Debug, Deserialize)]
pub struct ODataResponse<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.count")]
    pub count: Option<u64>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Parse a `Retry-After` header given in seconds.
#[must_use]
pub fn parse_retry_after(header_value: &str) -> Option<u64> {
    header_value.trim().parse::<u64>().ok()
}

/// Microsoft Graph API client bound to one [`GraphSession`].
#[derive(Debug)]
pub struct GraphClient {
    http_client: reqwest::Client,
    session: RwLock<GraphSession>,
    base_url: String,
    retry: RetryExecutor,
}

impl GraphClient {
    /// Creates a client that authenticates every request with `session`.
    pub fn new(http_client: reqwest::Client, config: &EntraConfig, session: GraphSession) -> Self {
        Self {
            http_client,
            session: RwLock::new(session),
            base_url: config.graph_base_url(),
            retry: RetryExecutor::new(config.retry.clone()),
        }
    }

    /// Builds the shared HTTP client for a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn http_client(config: &EntraConfig) -> EntraResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| EntraError::Config(format!("Failed to create HTTP client: {e}")))
    }

    /// The HTTP client shared by Graph calls and token requests.
    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// Returns the versioned base URL for Graph API requests.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Swap in a freshly acquired session.
    pub async fn replace_session(&self, session: GraphSession) {
        *self.session.write().await = session;
    }

    /// Whether the current session can still authenticate requests.
    pub async fn session_is_valid(&self) -> bool {
        !self.session.read().await.is_expired()
    }

    /// Performs a GET request and deserializes the JSON body.
    #[instrument(skip(self, headers))]
    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> EntraResult<T> {
        let response = self
            .send_with_retry(Method::GET, url, headers, None::<&()>)
            .await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(EntraError::from)
    }

    /// Performs a PATCH request whose success response has no body.
    #[instrument(skip(self, body))]
    pub async fn patch_no_content<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> EntraResult<()> {
        self.send_with_retry(Method::PATCH, url, &[], Some(body))
            .await
            .map(|_| ())
    }

    /// Sends a request, retrying throttled, gateway and connection failures.
    async fn send_with_retry<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<&B>,
    ) -> EntraResult<reqwest::Response> {
        self.retry
            .execute(|| self.send_once(method.clone(), url, headers, body))
            .await
    }

    /// One attempt. Non-success statuses come back as errors.
    async fn send_once<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<&B>,
    ) -> EntraResult<reqwest::Response> {
        let token = {
            let session = self.session.read().await;
            session.bearer_token()?.to_string()
        };

        let mut request = self.http_client.request(method, url).bearer_auth(&token);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        if let Some(b) = body {
            request = request.json(b);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            warn!(retry_after_secs = ?retry_after, "Graph throttled the request");
            return Err(EntraError::RateLimited {
                retry_after_secs: retry_after.unwrap_or(0),
            });
        }

        if status.is_success() {
            debug!(%status, "Graph request succeeded");
            return Ok(response);
        }

        Err(error_from_response(response).await)
    }
}

/// Convert a failed response into an [`EntraError`].
async fn error_from_response(response: reqwest::Response) -> EntraError {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return EntraError::SessionExpired;
    }

    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ODataError>(&body) {
        Ok(odata) => EntraError::GraphApi {
            status: status.as_u16(),
            code: odata.error.code,
            message: odata.error.message,
        },
        Err(_) => EntraError::GraphApi {
            status: status.as_u16(),
            code: status.to_string(),
            message: body,
        },
    }
}
