//! CLI error types and exit codes

use extattr_connector::error::ConnectorError;
use extattr_connector_entra::EntraError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error, or at least one object failed to sync
/// - 2: Authentication failed
/// - 3: Directory unreachable
/// - 4: Invalid input
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Directory error: {0}")]
    Directory(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("{failed} of {total} objects failed to sync")]
    SyncFailures { failed: usize, total: usize },

    #[error("{failed} of {total} writes failed")]
    WriteFailures { failed: usize, total: usize },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::AuthenticationFailed(_) => 2,
            CliError::ConnectionFailed(_) => 3,
            CliError::Validation(_) => 4,
            CliError::Config(_)
            | CliError::Directory(_)
            | CliError::Io(_)
            | CliError::SyncFailures { .. }
            | CliError::WriteFailures { .. } => 1,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {self}");
        } else {
            eprintln!("Error: {self}");
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {suggestion}");
            } else {
                eprintln!("\nSuggestion: {suggestion}");
            }
        }
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::AuthenticationFailed(_) => Some(
                "Check EXTATTR_LDAP_BIND_PASSWORD and EXTATTR_ENTRA_CLIENT_SECRET, then run 'extattr check'.",
            ),
            CliError::ConnectionFailed(_) => Some("Run 'extattr check' to test both directories."),
            CliError::SyncFailures { .. } => Some("Re-run with --report to see each failure."),
            _ => None,
        }
    }
}

impl From<ConnectorError> for CliError {
    fn from(e: ConnectorError) -> Self {
        match e {
            ConnectorError::AuthenticationFailed | ConnectorError::SessionExpired => {
                CliError::AuthenticationFailed(e.to_string())
            }
            ConnectorError::InvalidConfiguration { message } => CliError::Config(message),
            ref err if err.is_transient() => CliError::ConnectionFailed(e.to_string()),
            _ => CliError::Directory(e.to_string()),
        }
    }
}

impl From<EntraError> for CliError {
    fn from(e: EntraError) -> Self {
        match e {
            EntraError::Config(message) => CliError::Config(message),
            EntraError::Auth(message) => CliError::AuthenticationFailed(message),
            other => CliError::from(ConnectorError::from(other)),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}
