//! Computer object mapping.
//!
//! Converts raw LDAP search entries into [`LocalObject`] records.
//!
//! Attribute mapping:
//! - distinguishedName -> distinguished_name (falls back to the entry DN)
//! - name -> name (falls back to cn)
//! - sAMAccountName -> account_name
//! - objectSid -> security_identifier (binary, decoded to `S-1-...`)
//! - extensionAttribute1..15 -> attribute_slots

use ldap3::SearchEntry;
use tracing::debug;

use extattr_connector::model::LocalObject;
use extattr_connector::slot::{AttributeSlots, SlotIndex};

use crate::sid::decode_sid;

/// LDAP attributes requested for every computer search.
#[must_use]
pub fn computer_attributes() -> Vec<String> {
    let mut attrs = vec![
        "distinguishedName".to_string(),
        "name".to_string(),
        "cn".to_string(),
        "sAMAccountName".to_string(),
        "objectSid".to_string(),
    ];
    attrs.extend(SlotIndex::all().map(SlotIndex::attribute_name));
    attrs
}

/// Map one search entry to a computer record.
///
/// Entries without a distinguished name are unusable and yield `None`.
#[must_use]
pub fn map_computer_entry(entry: &SearchEntry) -> Option<LocalObject> {
    let dn = first_string(entry, "distinguishedName")
        .or_else(|| Some(entry.dn.clone()).filter(|dn| !dn.is_empty()))?;

    let name = first_string(entry, "name")
        .or_else(|| first_string(entry, "cn"))
        .unwrap_or_default();
    let account_name = first_string(entry, "sAMAccountName").unwrap_or_default();

    let mut slots = AttributeSlots::new();
    for slot in SlotIndex::all() {
        slots.set(slot, first_string(entry, &slot.attribute_name()));
    }

    let mut object = LocalObject::new(dn, name, account_name).with_slots(slots);
    object.security_identifier = extract_object_sid(entry);

    if object.security_identifier.is_none() {
        debug!(dn = %object.distinguished_name, "Computer entry has no usable objectSid");
    }

    Some(object)
}

/// Escape special characters in LDAP filter values (RFC 4515).
#[must_use]
pub fn escape_filter_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\5c"),
            '*' => escaped.push_str("\\2a"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\0' => escaped.push_str("\\00"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Filter finding one computer by name or account name, within `base_filter`.
#[must_use]
pub fn computer_name_filter(base_filter: &str, name: &str) -> String {
    let stripped = name.strip_suffix('$').unwrap_or(name);
    let escaped = escape_filter_value(stripped);
    format!("(&{base_filter}(|(name={escaped})(sAMAccountName={escaped}$)))")
}

/// First value of a text attribute. LDAP attribute names are case-insensitive.
fn first_string(entry: &SearchEntry, attribute: &str) -> Option<String> {
    entry
        .attrs
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(attribute))
        .and_then(|(_, values)| values.first().cloned())
}

/// objectSid lands in `bin_attrs` unless its bytes happen to be valid UTF-8.
fn extract_object_sid(entry: &SearchEntry) -> Option<String> {
    let binary = entry
        .bin_attrs
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("objectSid"))
        .and_then(|(_, values)| values.first())
        .and_then(|bytes| decode_sid(bytes));

    binary.or_else(|| {
        entry
            .attrs
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("objectSid"))
            .and_then(|(_, values)| values.first())
            .and_then(|text| decode_sid(text.as_bytes()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sid_bytes() -> Vec<u8> {
        let mut bytes = vec![1, 5, 0, 0, 0, 0, 0, 5];
        for sub in [21u32, 1004336348, 1177238915, 682003330, 1105] {
            bytes.extend_from_slice(&sub.to_le_bytes());
        }
        bytes
    }

    fn entry(attrs: &[(&str, &str)]) -> SearchEntry {
        SearchEntry {
            dn: "CN=WKS01,OU=Workstations,DC=corp,DC=example".to_string(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), vec![v.to_string()]))
                .collect(),
            bin_attrs: HashMap::new(),
        }
    }

    #[test]
    fn test_computer_attributes() {
        let attrs = computer_attributes();
        assert!(attrs.contains(&"objectSid".to_string()));
        assert!(attrs.contains(&"extensionAttribute1".to_string()));
        assert!(attrs.contains(&"extensionAttribute15".to_string()));
        assert_eq!(attrs.len(), 5 + 15);
    }

    #[test]
    fn test_map_full_entry() {
        let mut e = entry(&[
            ("distinguishedName", "CN=WKS01,OU=Workstations,DC=corp,DC=example"),
            ("name", "WKS01"),
            ("sAMAccountName", "WKS01$"),
            ("extensionAttribute3", "Finance"),
            ("extensionAttribute7", ""),
        ]);
        e.bin_attrs.insert("objectSid".to_string(), vec![sid_bytes()]);

        let object = map_computer_entry(&e).unwrap();
        assert_eq!(object.name, "WKS01");
        assert_eq!(object.account_name, "WKS01$");
        assert_eq!(
            object.security_identifier.as_deref(),
            Some("S-1-5-21-1004336348-1177238915-682003330-1105")
        );

        let slot = |n| SlotIndex::new(n).unwrap();
        assert_eq!(object.attribute_slots.get(slot(3)), Some("Finance"));
        assert_eq!(object.attribute_slots.get(slot(7)), Some(""));
        assert_eq!(object.attribute_slots.get(slot(1)), None);
    }

    #[test]
    fn test_map_entry_case_insensitive_names() {
        let e = entry(&[("samaccountname", "LAB02$"), ("EXTENSIONATTRIBUTE5", "Lab-A")]);
        let object = map_computer_entry(&e).unwrap();
        assert_eq!(object.account_name, "LAB02$");
        assert_eq!(
            object.attribute_slots.get(SlotIndex::new(5).unwrap()),
            Some("Lab-A")
        );
        // Falls back to the entry DN
        assert_eq!(
            object.distinguished_name,
            "CN=WKS01,OU=Workstations,DC=corp,DC=example"
        );
    }

    #[test]
    fn test_map_entry_without_dn() {
        let mut e = entry(&[("name", "ghost")]);
        e.dn = String::new();
        assert!(map_computer_entry(&e).is_none());
    }

    #[test]
    fn test_malformed_sid_is_absent() {
        let mut e = entry(&[("sAMAccountName", "WKS01$")]);
        e.bin_attrs.insert("objectSid".to_string(), vec![vec![1, 2, 3]]);
        let object = map_computer_entry(&e).unwrap();
        assert!(object.security_identifier.is_none());
    }

    #[test]
    fn test_escape_filter_value() {
        assert_eq!(escape_filter_value("simple"), "simple");
        assert_eq!(escape_filter_value("a*b"), "a\\2ab");
        assert_eq!(escape_filter_value("(x)"), "\\28x\\29");
        assert_eq!(escape_filter_value("back\\slash"), "back\\5cslash");
        assert_eq!(escape_filter_value("nul\0"), "nul\\00");
    }

    #[test]
    fn test_computer_name_filter() {
        assert_eq!(
            computer_name_filter("(objectClass=computer)", "WKS01$"),
            "(&(objectClass=computer)(|(name=WKS01)(sAMAccountName=WKS01$)))"
        );
        assert_eq!(
            computer_name_filter("(objectClass=computer)", "*"),
            "(&(objectClass=computer)(|(name=\\2a)(sAMAccountName=\\2a$)))"
        );
    }
}
