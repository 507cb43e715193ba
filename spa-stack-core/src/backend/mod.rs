//! The capability set the plan builder provisions through.
//!
//! The builder never talks to a cloud SDK directly: it submits resource
//! specifications to a [`ProvisioningBackend`] and asks it to look up hosted
//! zones. Hosted zones are resolved through a [`ZoneDirectory`], which only
//! lists candidates; [`select_zone`] enforces the exactly-one-match rule for
//! every directory.

mod memory;

use async_trait::async_trait;

use crate::error::{StackError, StackResult};
use crate::resources::{HostedZone, ResourceHandle, ResourceSpec};

pub use memory::{MemoryBackend, Submission};

/// Target of plan construction.
#[async_trait]
pub trait ProvisioningBackend: Send {
    /// Accept one resource specification and return a handle later
    /// specifications can reference.
    async fn create_resource(
        &mut self,
        logical_id: &str,
        spec: ResourceSpec,
    ) -> StackResult<ResourceHandle>;

    /// Find the existing hosted zone serving `domain_name`. Never creates one.
    async fn lookup_zone(&mut self, domain_name: &str) -> StackResult<HostedZone>;
}

/// Source of existing hosted zones.
#[async_trait]
pub trait ZoneDirectory: Send + Sync {
    /// Zones whose name equals `domain_name`. May return several.
    async fn find_zones(&self, domain_name: &str) -> StackResult<Vec<HostedZone>>;
}

/// Look up `domain_name` in `directory`, failing unless exactly one zone matches.
pub async fn select_zone<Z>(directory: &Z, domain_name: &str) -> StackResult<HostedZone>
where
    Z: ZoneDirectory + ?Sized,
{
    let mut zones = directory.find_zones(domain_name).await?;
    match zones.len() {
        0 => Err(StackError::lookup(domain_name, "no hosted zone found")),
        1 => Ok(zones.remove(0)),
        count => Err(StackError::lookup(
            domain_name,
            format!(
                "{count} hosted zones match: {}",
                zones
                    .iter()
                    .map(|zone| zone.zone_id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        )),
    }
}

/// Fixed list of zones, used for offline planning and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticZones {
    zones: Vec<HostedZone>,
}

impl StaticZones {
    pub fn new(zones: impl IntoIterator<Item = HostedZone>) -> Self {
        Self {
            zones: zones.into_iter().collect(),
        }
    }

    pub fn push(&mut self, zone: HostedZone) {
        self.zones.push(zone);
    }
}

#[async_trait]
impl ZoneDirectory for StaticZones {
    async fn find_zones(&self, domain_name: &str) -> StackResult<Vec<HostedZone>> {
        Ok(self
            .zones
            .iter()
            .filter(|zone| zone.matches(domain_name))
            .cloned()
            .collect())
    }
}
