//! Error types for the Entra ID connector.

use std::time::Duration;

use thiserror::Error;

use extattr_connector::error::ConnectorError;
use extattr_connector::resilience::Retryable;

/// Result type alias using `EntraError`.
pub type EntraResult<T> = Result<T, EntraError>;

/// Errors that can occur when interacting with Entra ID.
#[derive(Debug, Error)]
pub enum EntraError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// `OAuth2` authentication error.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The session token has expired; a new session must be acquired.
    #[error("Graph session expired, sign in again")]
    SessionExpired,

    /// Microsoft Graph API error.
    #[error("Graph API error ({status}): {code} - {message}")]
    GraphApi {
        status: u16,
        code: String,
        message: String,
    },

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Throttled by Graph. A zero delay means no `Retry-After` was sent.
    #[error("Rate limit exceeded, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl EntraError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            EntraError::RateLimited { .. } => true,
            EntraError::GraphApi { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            EntraError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

impl Retryable for EntraError {
    fn is_transient(&self) -> bool {
        EntraError::is_transient(self)
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            EntraError::RateLimited { retry_after_secs } if *retry_after_secs > 0 => {
                Some(Duration::from_secs(*retry_after_secs))
            }
            _ => None,
        }
    }
}

impl From<EntraError> for ConnectorError {
    fn from(error: EntraError) -> Self {
        match error {
            EntraError::Config(message) => ConnectorError::InvalidConfiguration { message },
            EntraError::Auth(_) => ConnectorError::AuthenticationFailed,
            EntraError::SessionExpired => ConnectorError::SessionExpired,
            EntraError::RateLimited { retry_after_secs } => {
                ConnectorError::RateLimited { retry_after_secs }
            }
            EntraError::GraphApi {
                status,
                code,
                message,
            } => match status {
                401 => ConnectorError::SessionExpired,
                403 => ConnectorError::AuthorizationFailed {
                    operation: format!("{code}: {message}"),
                },
                404 => ConnectorError::ObjectNotFound {
                    identifier: message,
                },
                400 => ConnectorError::InvalidData {
                    message: format!("{code}: {message}"),
                },
                429 => ConnectorError::RateLimited {
                    retry_after_secs: 0,
                },
                502..=504 => ConnectorError::TargetUnavailable {
                    message: format!("{code}: {message}"),
                },
                _ => ConnectorError::operation_failed(format!("{code}: {message}")),
            },
            EntraError::Http(e) if e.is_timeout() || e.is_connect() => {
                ConnectorError::network_with_source("Graph request failed", e)
            }
            EntraError::Http(e) => ConnectorError::operation_failed_with_source("Graph request failed", e),
            EntraError::Json(e) => ConnectorError::InvalidData {
                message: format!("unexpected Graph response: {e}"),
            },
            EntraError::Url(e) => ConnectorError::invalid_configuration(e.to_string()),
        }
    }
}
