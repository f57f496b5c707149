//! Explicit Graph session.
//!
//! A [`GraphSession`] is acquired once per run with the OAuth2
//! client-credentials flow and handed to the [`GraphClient`](crate::GraphClient).
//! It is never refreshed behind the caller's back: once the token expires,
//! every request fails with [`EntraError::SessionExpired`] until a new
//! session is acquired.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::{EntraConfig, EntraCredentials, EntraError, EntraResult};

/// Requests made this close to expiry are refused up front.
const EXPIRY_SKEW_SECS: i64 = 30;

/// OAuth2 token response from the identity platform.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// OAuth2 error response.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// An authenticated Graph session.
#[derive(Debug, Clone)]
pub struct GraphSession {
    tenant_id: String,
    access_token: SecretString,
    expires_at: DateTime<Utc>,
}

impl GraphSession {
    /// Acquire a session with the client-credentials flow.
    ///
    /// # Errors
    ///
    /// Returns [`EntraError::Auth`] when the token endpoint rejects the
    /// credentials or cannot be reached.
    #[instrument(skip_all, fields(tenant_id = %config.tenant_id))]
    pub async fn acquire(
        http_client: &reqwest::Client,
        config: &EntraConfig,
        credentials: &EntraCredentials,
    ) -> EntraResult<Self> {
        let scope = config.scope();
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.expose_secret()),
            ("scope", scope.as_str()),
        ];

        debug!(token_url = %config.token_url(), "Requesting access token");

        let response = http_client
            .post(config.token_url())
            .form(&params)
            .send()
            .await
            .map_err(|e| EntraError::Auth(format!("Token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => body,
            };
            return Err(EntraError::Auth(format!(
                "Token request failed with status {status}: {detail}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| EntraError::Auth(format!("Failed to parse token response: {e}")))?;

        let expires_at = Utc::now() + Duration::seconds(token.expires_in);

        info!(
            expires_at = %expires_at.format("%Y-%m-%d %H:%M:%S UTC"),
            "Graph session acquired"
        );

        Ok(Self::from_token(
            config.tenant_id.clone(),
            token.access_token,
            expires_at,
        ))
    }

    /// Wrap a token obtained elsewhere.
    pub fn from_token(
        tenant_id: impl Into<String>,
        access_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            access_token: SecretString::from(access_token.into()),
            expires_at,
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// True once the token is within the expiry skew.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_SKEW_SECS) >= self.expires_at
    }

    /// The bearer token, or `SessionExpired`.
    pub fn bearer_token(&self) -> EntraResult<&str> {
        if self.is_expired() {
            return Err(EntraError::SessionExpired);
        }
        Ok(self.access_token.expose_secret())
    }
}
