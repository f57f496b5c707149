//! Default container discovery.

/// Well-known container that holds newly joined computers.
const COMPUTERS_CONTAINER: &str = "CN=Computers";

/// Containers to enumerate when none are configured.
///
/// `domain_root` may be a distinguished name (`DC=corp,DC=example`) or a DNS
/// domain name (`corp.example`). Blank input yields no containers.
#[must_use]
pub fn discover_default_containers(domain_root: &str) -> Vec<String> {
    let root = domain_root.trim();
    if root.is_empty() {
        return Vec::new();
    }

    let root_dn = if root.contains('=') {
        root.to_string()
    } else {
        domain_to_dn(root)
    };

    if root_dn.is_empty() {
        return Vec::new();
    }

    vec![format!("{COMPUTERS_CONTAINER},{root_dn}")]
}

/// Convert `corp.example` to `DC=corp,DC=example`.
#[must_use]
pub fn domain_to_dn(domain: &str) -> String {
    domain
        .split('.')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(|label| format!("DC={label}"))
        .collect::<Vec<_>>()
        .join(",")
}
