//! Operation types: change sets, device filters and search scope.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::slot::SlotIndex;

/// What to do with one slot on the remote device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotChange {
    /// Write this value.
    Set(String),
    /// Null the slot out.
    Clear,
}

impl SlotChange {
    /// The value to send, `None` for a clear.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            SlotChange::Set(v) => Some(v),
            SlotChange::Clear => None,
        }
    }

    fn carries_value(&self) -> bool {
        matches!(self, SlotChange::Set(v) if !v.is_empty())
    }
}

/// Slot changes to apply to one remote device in a single update.
///
/// A change set counts as empty unless at least one slot carries a non-empty
/// value, even when it holds `Clear` entries. Empty change sets are never
/// sent.
///
/// Serializes as a map of attribute names to value or `null`:
///
/// ```
/// # use extattr_connector::operation::{ChangeSet, SlotChange};
/// # use extattr_connector::slot::SlotIndex;
/// let mut changes = ChangeSet::new();
/// changes.insert(SlotIndex::new(3).unwrap(), SlotChange::Set("Finance".into()));
/// changes.insert(SlotIndex::new(4).unwrap(), SlotChange::Clear);
/// let json = serde_json::to_string(&changes).unwrap();
/// assert_eq!(json, r#"{"extensionAttribute3":"Finance","extensionAttribute4":null}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: BTreeMap<SlotIndex, SlotChange>,
}

impl ChangeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slot: SlotIndex, change: SlotChange) {
        self.changes.insert(slot, change);
    }

    #[must_use]
    pub fn get(&self, slot: SlotIndex) -> Option<&SlotChange> {
        self.changes.get(&slot)
    }

    /// True unless some slot carries a non-empty value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.changes.values().any(SlotChange::carries_value)
    }

    /// Number of slots in the set, clears included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Number of slots that will be written with a value.
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.changes
            .values()
            .filter(|c| matches!(c, SlotChange::Set(_)))
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotIndex, &SlotChange)> {
        self.changes.iter().map(|(slot, change)| (*slot, change))
    }
}

impl Serialize for ChangeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.changes.len()))?;
        for (slot, change) in &self.changes {
            map.serialize_entry(&slot.attribute_name(), &change.value())?;
        }
        map.end()
    }
}

/// Criteria for finding a remote device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceFilter {
    /// Exact match on the on-premises security identifier.
    SecurityIdentifier(String),
    /// Exact match on the display name.
    DisplayName(String),
}

impl DeviceFilter {
    pub fn security_identifier(sid: impl Into<String>) -> Self {
        DeviceFilter::SecurityIdentifier(sid.into())
    }

    pub fn display_name(name: impl Into<String>) -> Self {
        DeviceFilter::DisplayName(name.into())
    }

    /// The value being matched.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            DeviceFilter::SecurityIdentifier(v) | DeviceFilter::DisplayName(v) => v,
        }
    }
}

/// How deep a container search goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    /// Immediate children only.
    OneLevel,
    /// The whole subtree below the container.
    #[default]
    Subtree,
}

impl SearchScope {
    #[must_use]
    pub fn from_recursive(recursive: bool) -> Self {
        if recursive {
            SearchScope::Subtree
        } else {
            SearchScope::OneLevel
        }
    }
}
