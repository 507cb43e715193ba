//! DNS side: the looked-up hosted zone and the alias record.

use super::Value;

/// An existing Route 53 hosted zone. Never created by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostedZone {
    pub name: String,
    pub zone_id: String,
}

impl HostedZone {
    pub fn new(name: impl Into<String>, zone_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            zone_id: zone_id.into(),
        }
    }

    /// Whether this zone serves `domain_name`, ignoring case and the
    /// trailing root dot.
    pub fn matches(&self, domain_name: &str) -> bool {
        normalize_zone_name(&self.name) == normalize_zone_name(domain_name)
    }
}

fn normalize_zone_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

/// `A` alias record pointing the custom domain at the distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasRecordSpec {
    pub record_name: String,
    pub zone: HostedZone,
    pub target_dns_name: Value,
}
