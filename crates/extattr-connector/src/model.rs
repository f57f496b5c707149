//! Directory records.

use serde::{Deserialize, Serialize};

use crate::slot::AttributeSlots;

/// One on-premises computer account, as read from the local directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalObject {
    /// Distinguished name, unique within the directory.
    pub distinguished_name: String,
    /// Common name of the computer.
    pub name: String,
    /// Logon name, conventionally ending in `$`.
    pub account_name: String,
    /// Textual security identifier (`S-1-5-21-...`).
    pub security_identifier: Option<String>,
    /// Extension attribute values.
    pub attribute_slots: AttributeSlots,
}

impl LocalObject {
    /// Create a record with no security identifier and all slots unset.
    pub fn new(
        distinguished_name: impl Into<String>,
        name: impl Into<String>,
        account_name: impl Into<String>,
    ) -> Self {
        Self {
            distinguished_name: distinguished_name.into(),
            name: name.into(),
            account_name: account_name.into(),
            security_identifier: None,
            attribute_slots: AttributeSlots::new(),
        }
    }

    #[must_use]
    pub fn with_security_identifier(mut self, sid: impl Into<String>) -> Self {
        self.security_identifier = Some(sid.into());
        self
    }

    #[must_use]
    pub fn with_slots(mut self, slots: AttributeSlots) -> Self {
        self.attribute_slots = slots;
        self
    }
}

/// One cloud device object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDevice {
    /// Object id, used to address updates.
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, rename = "onPremisesSecurityIdentifier")]
    pub security_identifier: Option<String>,
}

impl RemoteDevice {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            security_identifier: None,
        }
    }

    #[must_use]
    pub fn with_security_identifier(mut self, sid: impl Into<String>) -> Self {
        self.security_identifier = Some(sid.into());
        self
    }
}
