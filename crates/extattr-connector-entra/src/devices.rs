//! Device query and update requests.
//!
//! Device lookups use advanced query parameters (`$count=true` with
//! `ConsistencyLevel: eventual`) so that filters on
//! `onPremisesSecurityIdentifier` are accepted.

use serde::Serialize;

use extattr_connector::operation::{ChangeSet, DeviceFilter};

/// Properties requested for every device lookup.
pub const DEVICE_SELECT: &str = "id,displayName,onPremisesSecurityIdentifier";

/// Header required for advanced queries.
pub const CONSISTENCY_LEVEL: (&str, &str) = ("ConsistencyLevel", "eventual");

/// Escape a value for use inside a single-quoted OData string literal.
#[must_use]
pub fn escape_odata_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// The `$filter` expression for a device filter, before URL encoding.
#[must_use]
pub fn filter_expression(filter: &DeviceFilter) -> String {
    let property = match filter {
        DeviceFilter::SecurityIdentifier(_) => "onPremisesSecurityIdentifier",
        DeviceFilter::DisplayName(_) => "displayName",
    };
    format!("{property} eq '{}'", escape_odata_literal(filter.value()))
}

/// Full device query URL under `base_url`.
#[must_use]
pub fn device_query_url(base_url: &str, filter: &DeviceFilter, limit: usize) -> String {
    format!(
        "{base_url}/devices?$filter={}&$select={}&$top={}&$count=true",
        urlencoding::encode(&filter_expression(filter)),
        urlencoding::encode(DEVICE_SELECT),
        limit.max(1)
    )
}

/// URL addressing one device by object id.
#[must_use]
pub fn device_url(base_url: &str, device_id: &str) -> String {
    format!("{base_url}/devices/{}", urlencoding::encode(device_id))
}

/// PATCH body for an extension attribute update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUpdateRequest<'a> {
    pub extension_attributes: &'a ChangeSet,
}

#[cfg(test)]
mod tests {
    use super::*;
    use extattr_connector::operation::SlotChange;
    use extattr_connector::slot::SlotIndex;

    #[test]
    fn test_escape_odata_literal() {
        assert_eq!(escape_odata_literal("WKS01"), "WKS01");
        assert_eq!(escape_odata_literal("O'Brien-PC"), "O''Brien-PC");
        assert_eq!(escape_odata_literal("''"), "''''");
    }

    #[test]
    fn test_filter_expression() {
        assert_eq!(
            filter_expression(&DeviceFilter::security_identifier("S-1-5-21-1-2-3-1105")),
            "onPremisesSecurityIdentifier eq 'S-1-5-21-1-2-3-1105'"
        );
        assert_eq!(
            filter_expression(&DeviceFilter::display_name("O'Brien-PC")),
            "displayName eq 'O''Brien-PC'"
        );
    }

    #[test]
    fn test_device_query_url_is_encoded() {
        let url = device_query_url(
            "https://graph.microsoft.com/v1.0",
            &DeviceFilter::display_name("LAB 01&x"),
            1,
        );
        assert_eq!(
            url,
            "https://graph.microsoft.com/v1.0/devices?$filter=displayName%20eq%20%27LAB%2001%26x%27\
             &$select=id%2CdisplayName%2ConPremisesSecurityIdentifier&$top=1&$count=true"
        );
    }

    #[test]
    fn test_device_url() {
        assert_eq!(
            device_url("https://graph.microsoft.com/v1.0", "6a59ea83-02bd"),
            "https://graph.microsoft.com/v1.0/devices/6a59ea83-02bd"
        );
    }

    #[test]
    fn test_update_body_shape() {
        let mut changes = ChangeSet::new();
        changes.insert(SlotIndex::new(3).unwrap(), SlotChange::Set("Finance".to_string()));
        changes.insert(SlotIndex::new(4).unwrap(), SlotChange::Clear);

        let body = serde_json::to_value(DeviceUpdateRequest {
            extension_attributes: &changes,
        })
        .unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "extensionAttributes": {
                    "extensionAttribute3": "Finance",
                    "extensionAttribute4": null
                }
            })
        );
    }
}
