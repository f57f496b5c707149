//! # LDAP Connector
//!
//! Active Directory computer connector for extension attribute sync.
//!
//! ## Features
//!
//! - LDAP v3 with SSL/TLS or STARTTLS
//! - Paged computer searches with all fifteen extension attributes
//! - `objectSid` decoding to the textual `S-1-...` form
//! - Single-attribute replace and clear
//! - Organizational unit listing and default container discovery
//!
//! ## Example
//!
//! ```ignore
//! use extattr_connector::prelude::*;
//! use extattr_connector_ldap::{LdapConfig, LdapDirectory};
//!
//! let config = LdapConfig::new(
//!     "dc01.corp.example",
//!     "DC=corp,DC=example",
//!     "CN=svc-extattr,OU=Service,DC=corp,DC=example",
//! )
//! .with_password("secret")
//! .with_ssl();
//!
//! let directory = LdapDirectory::new(config)?;
//! let computers = directory
//!     .search_computers("OU=Workstations,DC=corp,DC=example", SearchScope::Subtree)
//!     .await?;
//! ```

pub mod computer;
pub mod config;
pub mod connector;
pub mod discovery;
pub mod sid;

// Re-exports
pub use config::LdapConfig;
pub use connector::LdapDirectory;
pub use discovery::discover_default_containers;
