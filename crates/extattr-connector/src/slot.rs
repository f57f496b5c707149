//! Extension attribute slots.
//!
//! Computer objects carry fifteen free-form string attributes named
//! `extensionAttribute1` through `extensionAttribute15`. A slot is addressed
//! through [`SlotIndex`], which can only hold a value in `1..=15`, and the
//! values of one object live in [`AttributeSlots`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConnectorError;

/// Number of extension attribute slots on a computer object.
pub const SLOT_COUNT: usize = 15;

const ATTRIBUTE_PREFIX: &str = "extensionAttribute";

/// A validated slot number in `1..=15`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SlotIndex(u8);

impl SlotIndex {
    /// Create a slot index, returning `None` when out of range.
    #[must_use]
    pub fn new(number: u8) -> Option<Self> {
        if (1..=SLOT_COUNT as u8).contains(&number) {
            Some(Self(number))
        } else {
            None
        }
    }

    /// The slot number, `1..=15`.
    #[must_use]
    pub fn number(self) -> u8 {
        self.0
    }

    /// Directory attribute name for this slot, e.g. `extensionAttribute3`.
    #[must_use]
    pub fn attribute_name(self) -> String {
        format!("{ATTRIBUTE_PREFIX}{}", self.0)
    }

    /// Parse a directory attribute name back to its slot.
    ///
    /// Matching is case-insensitive, since LDAP attribute names are.
    #[must_use]
    pub fn from_attribute_name(name: &str) -> Option<Self> {
        let prefix = name.get(..ATTRIBUTE_PREFIX.len())?;
        if !prefix.eq_ignore_ascii_case(ATTRIBUTE_PREFIX) {
            return None;
        }
        name[ATTRIBUTE_PREFIX.len()..]
            .parse::<u8>()
            .ok()
            .and_then(Self::new)
    }

    /// Iterate over every slot in ascending order.
    pub fn all() -> impl Iterator<Item = SlotIndex> {
        (1..=SLOT_COUNT as u8).map(SlotIndex)
    }

    fn position(self) -> usize {
        usize::from(self.0) - 1
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for SlotIndex {
    type Error = ConnectorError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| ConnectorError::InvalidData {
            message: format!("slot {value} is outside 1..={SLOT_COUNT}"),
        })
    }
}

impl From<SlotIndex> for u8 {
    fn from(slot: SlotIndex) -> Self {
        slot.0
    }
}

impl FromStr for SlotIndex {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number: u8 = s.trim().parse().map_err(|_| ConnectorError::InvalidData {
            message: format!("'{s}' is not a slot number"),
        })?;
        Self::try_from(number)
    }
}

/// The fifteen slot values of one object.
///
/// A slot is either unset (`None`) or holds a string, which may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSlots([Option<String>; SLOT_COUNT]);

impl AttributeSlots {
    /// All slots unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a slot, `None` when unset.
    #[must_use]
    pub fn get(&self, slot: SlotIndex) -> Option<&str> {
        self.0[slot.position()].as_deref()
    }

    /// Set or unset a slot.
    pub fn set(&mut self, slot: SlotIndex, value: Option<String>) {
        self.0[slot.position()] = value;
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, slot: SlotIndex, value: impl Into<String>) -> Self {
        self.set(slot, Some(value.into()));
        self
    }

    /// True when no slot holds a value.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    /// Iterate over `(slot, value)` for every slot, set or not.
    pub fn iter(&self) -> impl Iterator<Item = (SlotIndex, Option<&str>)> {
        SlotIndex::all().map(move |slot| (slot, self.get(slot)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_range() {
        assert!(SlotIndex::new(0).is_none());
        assert!(SlotIndex::new(1).is_some());
        assert!(SlotIndex::new(15).is_some());
        assert!(SlotIndex::new(16).is_none());
        assert_eq!(SlotIndex::all().count(), SLOT_COUNT);
    }

    #[test]
    fn test_attribute_name_round_trip() {
        let slot = SlotIndex::new(12).unwrap();
        assert_eq!(slot.attribute_name(), "extensionAttribute12");
        assert_eq!(SlotIndex::from_attribute_name("extensionattribute12"), Some(slot));
        assert_eq!(SlotIndex::from_attribute_name("extensionAttribute16"), None);
        assert_eq!(SlotIndex::from_attribute_name("extension"), None);
        assert_eq!(SlotIndex::from_attribute_name("description"), None);
    }

    #[test]
    fn test_parse_slot() {
        assert_eq!("7".parse::<SlotIndex>().unwrap().number(), 7);
        assert!("0".parse::<SlotIndex>().is_err());
        assert!("x".parse::<SlotIndex>().is_err());
    }

    #[test]
    fn test_unset_versus_empty() {
        let slot = SlotIndex::new(2).unwrap();
        let mut slots = AttributeSlots::new();
        assert!(slots.is_unset());

        slots.set(slot, Some(String::new()));
        assert!(!slots.is_unset());
        assert_eq!(slots.get(slot), Some(""));

        slots.set(slot, None);
        assert_eq!(slots.get(slot), None);
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        let parsed: Result<SlotIndex, _> = serde_json::from_str("16");
        assert!(parsed.is_err());
        let parsed: SlotIndex = serde_json::from_str("4").unwrap();
        assert_eq!(parsed.number(), 4);
    }
}
