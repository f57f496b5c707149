//! Per-object outcomes and run summaries.

use std::fmt;

use serde::Serialize;

use extattr_connector::model::LocalObject;

use crate::matcher::{MatchTier, RemoteMatch};

/// Terminal state of one object in a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// No selected slot carried a value; nothing was looked up.
    Skipped,
    /// No remote device matched.
    NoMatch,
    /// A device matched; the change was reported but not written.
    Preview,
    /// The change was written.
    Success,
    /// The update failed.
    Error,
}

impl SyncStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Skipped => "skipped",
            SyncStatus::NoMatch => "no_match",
            SyncStatus::Preview => "preview",
            SyncStatus::Success => "success",
            SyncStatus::Error => "error",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for one local object.
///
/// Built only through the constructors below, which keep the matched id
/// consistent with the status: absent for `Skipped` and `NoMatch`, present
/// for `Preview` and `Success`. An `Error` carries it only when the failure
/// happened after matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    subject_name: String,
    distinguished_name: String,
    status: SyncStatus,
    detail: String,
    matched_remote_id: Option<String>,
    match_tier: Option<MatchTier>,
}

impl SyncResult {
    pub fn skipped(local: &LocalObject) -> Self {
        Self::unmatched(local, SyncStatus::Skipped, "no selected attribute has a value")
    }

    pub fn no_match(local: &LocalObject) -> Self {
        Self::unmatched(local, SyncStatus::NoMatch, "no matching device found")
    }

    pub fn preview(local: &LocalObject, remote: &RemoteMatch, detail: impl Into<String>) -> Self {
        Self::matched(local, remote, SyncStatus::Preview, detail.into())
    }

    pub fn success(local: &LocalObject, remote: &RemoteMatch, detail: impl Into<String>) -> Self {
        Self::matched(local, remote, SyncStatus::Success, detail.into())
    }

    /// A failed update against a matched device.
    pub fn error(local: &LocalObject, remote: &RemoteMatch, reason: impl Into<String>) -> Self {
        Self::matched(local, remote, SyncStatus::Error, reason.into())
    }

    /// A failure before any device was matched, identified by name only.
    pub fn failed(
        subject_name: impl Into<String>,
        distinguished_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            subject_name: subject_name.into(),
            distinguished_name: distinguished_name.into(),
            status: SyncStatus::Error,
            detail: reason.into(),
            matched_remote_id: None,
            match_tier: None,
        }
    }

    fn unmatched(local: &LocalObject, status: SyncStatus, detail: &str) -> Self {
        Self {
            subject_name: local.account_name.clone(),
            distinguished_name: local.distinguished_name.clone(),
            status,
            detail: detail.to_string(),
            matched_remote_id: None,
            match_tier: None,
        }
    }

    fn matched(local: &LocalObject, remote: &RemoteMatch, status: SyncStatus, detail: String) -> Self {
        Self {
            subject_name: local.account_name.clone(),
            distinguished_name: local.distinguished_name.clone(),
            status,
            detail,
            matched_remote_id: Some(remote.device.id.clone()),
            match_tier: Some(remote.tier),
        }
    }

    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    pub fn distinguished_name(&self) -> &str {
        &self.distinguished_name
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn matched_remote_id(&self) -> Option<&str> {
        self.matched_remote_id.as_deref()
    }

    pub fn match_tier(&self) -> Option<MatchTier> {
        self.match_tier
    }
}

/// Counts derived from a collection of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub total: usize,
    pub skipped: usize,
    pub no_match: usize,
    pub preview: usize,
    pub success: usize,
    pub error: usize,
}

impl SyncSummary {
    #[must_use]
    pub fn from_results(results: &[SyncResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.total += 1;
            match result.status() {
                SyncStatus::Skipped => summary.skipped += 1,
                SyncStatus::NoMatch => summary.no_match += 1,
                SyncStatus::Preview => summary.preview += 1,
                SyncStatus::Success => summary.success += 1,
                SyncStatus::Error => summary.error += 1,
            }
        }
        summary
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error > 0
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} objects: {} success, {} preview, {} no match, {} skipped, {} error",
            self.total, self.success, self.preview, self.no_match, self.skipped, self.error
        )
    }
}

/// Outcome of one local attribute write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    pub target: String,
    pub slot: u8,
    pub cleared: bool,
    pub success: bool,
    pub diagnostic: Option<String>,
}

impl WriteOutcome {
    pub(crate) fn succeeded(target: &str, slot: u8, cleared: bool) -> Self {
        Self {
            target: target.to_string(),
            slot,
            cleared,
            success: true,
            diagnostic: None,
        }
    }

    pub(crate) fn failed(target: &str, slot: u8, cleared: bool, diagnostic: impl Into<String>) -> Self {
        Self {
            target: target.to_string(),
            slot,
            cleared,
            success: false,
            diagnostic: Some(diagnostic.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extattr_connector::model::RemoteDevice;

    fn local() -> LocalObject {
        LocalObject::new("CN=WKS01,DC=corp,DC=example", "WKS01", "WKS01$")
    }

    fn remote() -> RemoteMatch {
        RemoteMatch {
            device: RemoteDevice::new("dev-1", "WKS01"),
            tier: MatchTier::DisplayName,
        }
    }

    #[test]
    fn test_unmatched_results_have_no_id() {
        for result in [SyncResult::skipped(&local()), SyncResult::no_match(&local())] {
            assert!(result.matched_remote_id().is_none());
            assert!(result.match_tier().is_none());
            assert_eq!(result.subject_name(), "WKS01$");
        }
    }

    #[test]
    fn test_failed_result_is_unmatched_error() {
        let result = SyncResult::failed("WKS01$", "CN=WKS01,DC=corp,DC=example", "task aborted");
        assert_eq!(result.status(), SyncStatus::Error);
        assert_eq!(result.detail(), "task aborted");
        assert!(result.matched_remote_id().is_none());
        assert!(result.match_tier().is_none());
    }

    #[test]
    fn test_matched_results_carry_id() {
        let preview = SyncResult::preview(&local(), &remote(), "would set 1 attribute");
        assert_eq!(preview.status(), SyncStatus::Preview);
        assert_eq!(preview.matched_remote_id(), Some("dev-1"));
        assert_eq!(preview.match_tier(), Some(MatchTier::DisplayName));

        let error = SyncResult::error(&local(), &remote(), "forbidden");
        assert_eq!(error.status(), SyncStatus::Error);
        assert_eq!(error.detail(), "forbidden");
        assert_eq!(error.matched_remote_id(), Some("dev-1"));
    }

    #[test]
    fn test_summary_counts() {
        let results = vec![
            SyncResult::skipped(&local()),
            SyncResult::no_match(&local()),
            SyncResult::success(&local(), &remote(), "ok"),
            SyncResult::success(&local(), &remote(), "ok"),
            SyncResult::error(&local(), &remote(), "boom"),
        ];
        let summary = SyncSummary::from_results(&results);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.success, 2);
        assert_eq!(summary.error, 1);
        assert!(summary.has_errors());
        assert_eq!(
            summary.to_string(),
            "5 objects: 2 success, 0 preview, 1 no match, 1 skipped, 1 error"
        );
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&SyncStatus::NoMatch).unwrap(),
            "\"no_match\""
        );
    }
}
