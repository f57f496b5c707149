//! Microsoft Entra ID device connector
//!
//! Implements [`RemoteDirectory`](extattr_connector::traits::RemoteDirectory)
//! over the Microsoft Graph API: device lookup by security identifier or
//! display name, and extension attribute updates.
//!
//! # Features
//!
//! - `OAuth2` client credentials authentication, acquired once per run
//! - Retry with backoff on throttling and gateway errors
//! - Multi-cloud support (Commercial, US Government, China)
//!
//! # Example
//!
//! ```no_run
//! use extattr_connector::traits::Connector;
//! use extattr_connector_entra::{EntraConfig, EntraCredentials, EntraDeviceDirectory};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EntraConfig::builder()
//!     .tenant_id("your-tenant-id")
//!     .build()?;
//!
//! let credentials = EntraCredentials::new("your-client-id", "your-client-secret");
//!
//! let directory = EntraDeviceDirectory::connect(config, &credentials).await?;
//! directory.test_connection().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod connector;
pub mod devices;
mod error;
pub mod graph_client;
mod session;

// Re-exports
pub use config::{EntraCloudEnvironment, EntraConfig, EntraConfigBuilder, EntraCredentials};
pub use connector::EntraDeviceDirectory;
pub use error::{EntraError, EntraResult};
pub use graph_client::GraphClient;
pub use session::GraphSession;
