//! Change set construction from a local object's slots.

use std::collections::BTreeSet;

use extattr_connector::model::LocalObject;
use extattr_connector::operation::{ChangeSet, SlotChange};
use extattr_connector::slot::SlotIndex;

/// Build the change set for the selected slots of `local`.
///
/// Slot numbers outside 1..=15 are dropped. Unset and empty slots become
/// [`SlotChange::Clear`] so the remote value is nulled. The result reports
/// [`ChangeSet::is_empty`] unless some selected slot holds a non-empty value.
#[must_use]
pub fn build_change_set(local: &LocalObject, selected_slots: &BTreeSet<u8>) -> ChangeSet {
    let mut changes = ChangeSet::new();

    for slot in selected_slots.iter().copied().filter_map(SlotIndex::new) {
        let change = match local.attribute_slots.get(slot) {
            Some(value) if !value.is_empty() => SlotChange::Set(value.to_string()),
            _ => SlotChange::Clear,
        };
        changes.insert(slot, change);
    }

    changes
}
