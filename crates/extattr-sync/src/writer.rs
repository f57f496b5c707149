//! Single-slot writes back to the local directory.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use extattr_connector::slot::SlotIndex;
use extattr_connector::traits::LocalDirectory;

use crate::result::WriteOutcome;

/// Sets or clears one slot on local computer objects.
#[derive(Clone)]
pub struct LocalWriter {
    directory: Arc<dyn LocalDirectory>,
}

impl LocalWriter {
    pub fn new(directory: Arc<dyn LocalDirectory>) -> Self {
        Self { directory }
    }

    /// Write `value` to `slot` on `target`. `None` or an empty string clears it.
    ///
    /// `target` is a distinguished name or a bare computer name; a name is
    /// looked up first and the outcome reports the resolved DN. Never fails;
    /// a rejected write comes back with `success = false`.
    #[instrument(skip(self, value))]
    pub async fn write_attribute(
        &self,
        target: &str,
        slot: u8,
        value: Option<&str>,
    ) -> WriteOutcome {
        let value = value.filter(|v| !v.is_empty());
        let cleared = value.is_none();

        let Some(index) = SlotIndex::new(slot) else {
            warn!("Rejected write to invalid slot");
            return WriteOutcome::failed(
                target,
                slot,
                cleared,
                format!("slot {slot} is outside 1..=15"),
            );
        };

        let dn = match self.resolve_target(target).await {
            Ok(dn) => dn,
            Err(diagnostic) => {
                warn!(%diagnostic, "Target not resolved");
                return WriteOutcome::failed(target, slot, cleared, diagnostic);
            }
        };

        match self.directory.write_slot(&dn, index, value).await {
            Ok(()) => {
                info!(dn = %dn, cleared, "Attribute written");
                WriteOutcome::succeeded(&dn, slot, cleared)
            }
            Err(e) => {
                warn!(error = %e, error_code = e.error_code(), "Attribute write failed");
                WriteOutcome::failed(&dn, slot, cleared, e.to_string())
            }
        }
    }

    async fn resolve_target(&self, target: &str) -> Result<String, String> {
        if is_distinguished_name(target) {
            return Ok(target.to_string());
        }
        match self.directory.find_computer(target).await {
            Ok(Some(object)) => {
                debug!(name = %target, dn = %object.distinguished_name, "Resolved computer name");
                Ok(object.distinguished_name)
            }
            Ok(None) => Err(format!("no computer named {target}")),
            Err(e) => Err(format!("lookup of {target} failed: {e}")),
        }
    }

    /// Apply the same write to each target in turn.
    #[instrument(skip(self, targets, value), fields(target_count = targets.len()))]
    pub async fn write_many<S: AsRef<str>>(
        &self,
        targets: &[S],
        slot: u8,
        value: Option<&str>,
    ) -> Vec<WriteOutcome> {
        let mut outcomes = Vec::with_capacity(targets.len());
        for target in targets {
            outcomes.push(self.write_attribute(target.as_ref(), slot, value).await);
        }

        let failed = outcomes.iter().filter(|o| !o.success).count();
        info!(
            written = outcomes.len() - failed,
            failed, "Batch write complete"
        );
        outcomes
    }
}

fn is_distinguished_name(target: &str) -> bool {
    target.contains('=')
}

impl fmt::Debug for LocalWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalWriter")
            .field("directory", &self.directory.display_name())
            .finish()
    }
}
