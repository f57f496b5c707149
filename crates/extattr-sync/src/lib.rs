//! # Extension Attribute Sync Engine
//!
//! Copies `extensionAttribute1..15` values from on-premises computer objects
//! to the matching Entra ID devices.
//!
//! The engine is stateless between runs. It holds two directory handles,
//! injected at construction:
//!
//! - [`DirectoryReader`] and [`LocalWriter`] over a
//!   [`LocalDirectory`](extattr_connector::traits::LocalDirectory)
//! - [`IdentityMatcher`] and [`SyncOrchestrator`] over a
//!   [`RemoteDirectory`](extattr_connector::traits::RemoteDirectory) that
//!   already owns an authenticated session
//!
//! Every object yields exactly one [`SyncResult`]; failures are recorded per
//! object and never stop the batch.

pub mod differ;
pub mod matcher;
pub mod orchestrator;
pub mod reader;
pub mod result;
pub mod writer;

pub use differ::build_change_set;
pub use matcher::{strip_account_suffix, IdentityMatcher, MatchTier, RemoteMatch};
pub use orchestrator::{CancellationFlag, SyncOrchestrator, DEFAULT_WORKER_COUNT};
pub use reader::{DirectoryReader, Enumeration};
pub use result::{SyncResult, SyncStatus, SyncSummary, WriteOutcome};
pub use writer::LocalWriter;
