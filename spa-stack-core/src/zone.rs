//! Memoized hosted zone lookup.

use std::collections::HashMap;

use log::{debug, info};

use crate::backend::ProvisioningBackend;
use crate::error::StackResult;
use crate::resources::HostedZone;

/// Resolves existing hosted zones through the backend, once per domain.
#[derive(Debug, Default, Clone)]
pub struct HostedZoneLookup {
    resolved: HashMap<String, HostedZone>,
}

impl HostedZoneLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zone serving `domain_name`. `logical_id` names the lookup in logs.
    pub async fn resolve<B>(
        &mut self,
        backend: &mut B,
        logical_id: &str,
        domain_name: &str,
    ) -> StackResult<HostedZone>
    where
        B: ProvisioningBackend + ?Sized,
    {
        if let Some(zone) = self.resolved.get(domain_name) {
            debug!("Reusing hosted zone {} for {}", zone.zone_id, domain_name);
            return Ok(zone.clone());
        }

        let zone = backend.lookup_zone(domain_name).await?;
        info!(
            "Resolved hosted zone {} ({}) as {}",
            zone.name, zone.zone_id, logical_id
        );
        self.resolved.insert(domain_name.to_string(), zone.clone());
        Ok(zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    #[tokio::test]
    async fn test_repeated_lookups_hit_backend_once() {
        let mut backend =
            MemoryBackend::new("eu-west-1").with_zone(HostedZone::new("example.com.", "Z1"));
        let mut lookup = HostedZoneLookup::new();

        let first = lookup
            .resolve(&mut backend, "siteRootHz", "example.com")
            .await
            .unwrap();
        let second = lookup
            .resolve(&mut backend, "siteRootHz", "example.com")
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.zone_lookups().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_lookup_is_not_cached() {
        let mut backend = MemoryBackend::new("eu-west-1");
        let mut lookup = HostedZoneLookup::new();

        assert!(lookup
            .resolve(&mut backend, "siteRootHz", "example.com")
            .await
            .is_err());
        assert!(lookup
            .resolve(&mut backend, "siteRootHz", "example.com")
            .await
            .is_err());
        assert_eq!(backend.zone_lookups().len(), 2);
    }
}
