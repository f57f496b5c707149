//! Per-object sync state machine and bounded-parallel batch runner.
//!
//! ```text
//! build_change_set
//!   empty     -> Skipped
//!   non-empty -> find_remote_match
//!     none  -> NoMatch
//!     match -> Preview (preview) | update_device -> Success | Error
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{debug, error, info, instrument, warn};

use extattr_connector::model::LocalObject;
use extattr_connector::operation::ChangeSet;
use extattr_connector::traits::RemoteDirectory;

use crate::differ::build_change_set;
use crate::matcher::IdentityMatcher;
use crate::result::{SyncResult, SyncSummary};

/// Default number of objects processed concurrently.
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Batch-level cancellation shared between the runner and its caller.
///
/// Raising the flag stops new objects from starting; objects already in
/// flight complete.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Drives sync attempts against one authenticated remote directory.
#[derive(Clone)]
pub struct SyncOrchestrator {
    remote: Arc<dyn RemoteDirectory>,
    matcher: IdentityMatcher,
    worker_count: usize,
}

impl SyncOrchestrator {
    pub fn new(remote: Arc<dyn RemoteDirectory>) -> Self {
        Self {
            matcher: IdentityMatcher::new(Arc::clone(&remote)),
            remote,
            worker_count: DEFAULT_WORKER_COUNT,
        }
    }

    /// Set the concurrency bound. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count.max(1);
        self
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn matcher(&self) -> &IdentityMatcher {
        &self.matcher
    }

    /// Run one object through the state machine.
    #[instrument(skip(self, local, selected_slots), fields(subject = %local.account_name))]
    pub async fn sync_one(
        &self,
        local: &LocalObject,
        selected_slots: &BTreeSet<u8>,
        preview: bool,
    ) -> SyncResult {
        let changes = build_change_set(local, selected_slots);
        if changes.is_empty() {
            debug!("No selected attribute has a value, skipping");
            return SyncResult::skipped(local);
        }

        let Some(remote) = self.matcher.find_remote_match(local).await else {
            info!("No matching device");
            return SyncResult::no_match(local);
        };

        let summary = describe_changes(&changes);

        if preview {
            info!(device_id = %remote.device.id, tier = %remote.tier, "Preview");
            return SyncResult::preview(local, &remote, format!("would {summary}"));
        }

        match self.remote.update_device(&remote.device.id, &changes).await {
            Ok(()) => {
                info!(device_id = %remote.device.id, tier = %remote.tier, "Device updated");
                SyncResult::success(local, &remote, summary)
            }
            Err(e) => {
                warn!(
                    device_id = %remote.device.id,
                    error = %e,
                    error_code = e.error_code(),
                    "Device update failed"
                );
                SyncResult::error(local, &remote, e.to_string())
            }
        }
    }

    /// Sync every object, at most `worker_count` at a time.
    ///
    /// One result is produced per started object, in completion order. A task
    /// that panics or is aborted yields an `Error` result for its object. Once
    /// `cancel` is raised no further objects start.
    #[instrument(skip_all, fields(batch_size = objects.len(), preview = preview))]
    pub async fn sync_batch(
        &self,
        objects: Vec<LocalObject>,
        selected_slots: &BTreeSet<u8>,
        preview: bool,
        cancel: &CancellationFlag,
    ) -> Vec<SyncResult> {
        let total = objects.len();
        let semaphore = Arc::new(Semaphore::new(self.worker_count));
        let slots = Arc::new(selected_slots.clone());
        let mut tasks = JoinSet::new();
        let mut results = Vec::with_capacity(total);
        let mut pending: HashMap<Id, (String, String)> = HashMap::new();

        for local in objects {
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };
            if cancel.is_cancelled() {
                info!(started = tasks.len() + results.len(), total, "Batch cancelled");
                break;
            }

            let identity = (local.account_name.clone(), local.distinguished_name.clone());
            let this = self.clone();
            let slots = Arc::clone(&slots);
            let handle = tasks.spawn(async move {
                let _permit = permit;
                this.sync_one(&local, &slots, preview).await
            });
            pending.insert(handle.id(), identity);

            // Collect finished tasks as we go so the set stays small.
            while let Some(joined) = tasks.try_join_next_with_id() {
                collect(joined, &mut pending, &mut results);
            }
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            collect(joined, &mut pending, &mut results);
        }

        info!(summary = %SyncSummary::from_results(&results), "Batch complete");
        results
    }
}

fn collect(
    joined: Result<(Id, SyncResult), JoinError>,
    pending: &mut HashMap<Id, (String, String)>,
    results: &mut Vec<SyncResult>,
) {
    match joined {
        Ok((id, result)) => {
            pending.remove(&id);
            results.push(result);
        }
        Err(e) => {
            let Some((subject, dn)) = pending.remove(&e.id()) else {
                error!(error = %e, "Unknown sync task did not complete");
                return;
            };
            error!(subject = %subject, error = %e, "Sync task did not complete");
            results.push(SyncResult::failed(
                subject,
                dn,
                format!("sync task did not complete: {e}"),
            ));
        }
    }
}

fn describe_changes(changes: &ChangeSet) -> String {
    let set = changes.value_count();
    let cleared = changes.len() - set;
    match cleared {
        0 => format!("set {set} attribute(s)"),
        _ => format!("set {set} attribute(s), clear {cleared}"),
    }
}

impl fmt::Debug for SyncOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncOrchestrator")
            .field("remote", &self.remote.display_name())
            .field("worker_count", &self.worker_count)
            .finish()
    }
}
