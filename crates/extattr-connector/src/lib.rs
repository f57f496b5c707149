//! # Connector Framework
//!
//! Shared abstractions for moving extension attribute values from an
//! on-premises directory to a cloud device directory.
//!
//! ## Architecture
//!
//! Two capability traits describe the directories the sync engine talks to:
//!
//! - [`LocalDirectory`](traits::LocalDirectory) - enumerate computer objects and
//!   write a single attribute slot (LDAP / Active Directory)
//! - [`RemoteDirectory`](traits::RemoteDirectory) - query devices by filter and
//!   apply a [`ChangeSet`](operation::ChangeSet) (Microsoft Graph)
//!
//! ## Crate Organization
//!
//! - [`slot`] - `SlotIndex` and the fixed-size `AttributeSlots` map
//! - [`model`] - `LocalObject` and `RemoteDevice` records
//! - [`operation`] - change sets, device filters, search scope
//! - [`error`] - error types with transient/permanent classification
//! - [`traits`] - connector capability traits
//! - [`resilience`] - retry with exponential backoff

pub mod error;
pub mod model;
pub mod operation;
pub mod resilience;
pub mod slot;
pub mod traits;

/// Prelude module for convenient imports.
///
/// ```
/// use extattr_connector::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{ConnectorError, ConnectorResult};
    pub use crate::model::{LocalObject, RemoteDevice};
    pub use crate::operation::{ChangeSet, DeviceFilter, SearchScope, SlotChange};
    pub use crate::resilience::{RetryConfig, RetryExecutor, Retryable};
    pub use crate::slot::{AttributeSlots, SlotIndex, SLOT_COUNT};
    pub use crate::traits::{Connector, LocalDirectory, RemoteDirectory};
}

// Re-export async_trait for connector implementors
pub use async_trait::async_trait;
