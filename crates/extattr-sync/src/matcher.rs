//! Two-tier device matching: security identifier first, then display name.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use extattr_connector::model::{LocalObject, RemoteDevice};
use extattr_connector::operation::DeviceFilter;
use extattr_connector::traits::RemoteDirectory;

/// Trailing marker on computer account names.
const ACCOUNT_SUFFIX: char = '$';

/// Which lookup produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    SecurityIdentifier,
    DisplayName,
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchTier::SecurityIdentifier => f.write_str("security_identifier"),
            MatchTier::DisplayName => f.write_str("display_name"),
        }
    }
}

/// A device paired with the tier that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMatch {
    pub device: RemoteDevice,
    pub tier: MatchTier,
}

/// Strip one trailing `$` from a computer account name.
#[must_use]
pub fn strip_account_suffix(account_name: &str) -> &str {
    account_name
        .strip_suffix(ACCOUNT_SUFFIX)
        .unwrap_or(account_name)
}

/// Finds the remote device corresponding to a local computer.
#[derive(Clone)]
pub struct IdentityMatcher {
    remote: Arc<dyn RemoteDirectory>,
}

impl IdentityMatcher {
    pub fn new(remote: Arc<dyn RemoteDirectory>) -> Self {
        Self { remote }
    }

    /// First device by security identifier, else first device by display name.
    ///
    /// Each tier issues at most one query. A failed query counts as no match
    /// for that tier. Multiple devices sharing a display name are not
    /// disambiguated; the directory's own ordering decides.
    #[instrument(skip(self, local), fields(subject = %local.account_name))]
    pub async fn find_remote_match(&self, local: &LocalObject) -> Option<RemoteMatch> {
        if let Some(sid) = local.security_identifier.as_deref().filter(|s| !s.is_empty()) {
            if let Some(device) = self
                .query_first(&DeviceFilter::security_identifier(sid))
                .await
            {
                debug!(device_id = %device.id, "Matched by security identifier");
                return Some(RemoteMatch {
                    device,
                    tier: MatchTier::SecurityIdentifier,
                });
            }
        }

        let name = strip_account_suffix(&local.account_name);
        if name.is_empty() {
            return None;
        }

        let device = self.query_first(&DeviceFilter::display_name(name)).await?;
        debug!(device_id = %device.id, "Matched by display name");
        Some(RemoteMatch {
            device,
            tier: MatchTier::DisplayName,
        })
    }

    async fn query_first(&self, filter: &DeviceFilter) -> Option<RemoteDevice> {
        match self.remote.find_devices(filter, 1).await {
            Ok(devices) => devices.into_iter().next(),
            Err(e) => {
                warn!(
                    filter = ?filter,
                    error = %e,
                    error_code = e.error_code(),
                    "Device query failed, treating as no match"
                );
                None
            }
        }
    }
}

impl fmt::Debug for IdentityMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityMatcher")
            .field("remote", &self.remote.display_name())
            .finish()
    }
}
