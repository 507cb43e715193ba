use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use log::debug;

use super::{select_zone, ProvisioningBackend, StaticZones};
use crate::error::{StackError, StackResult};
use crate::resources::{attr, HostedZone, ResourceHandle, ResourceKind, ResourceSpec};

/// Account id used in the ARNs the in-memory backend makes up.
const PLACEHOLDER_ACCOUNT: &str = "123456789012";

/// A resource accepted by [`MemoryBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub logical_id: String,
    pub region: String,
    pub spec: ResourceSpec,
}

/// Backend that records submissions and resolves every attribute
/// immediately with made-up physical ids.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    region: String,
    zones: StaticZones,
    assume_zones: bool,
    physical_ids: HashMap<String, String>,
    rejected: HashSet<String>,
    submissions: Vec<Submission>,
    zone_lookups: Vec<String>,
}

impl MemoryBackend {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            zones: StaticZones::default(),
            assume_zones: false,
            physical_ids: HashMap::new(),
            rejected: HashSet::new(),
            submissions: Vec::new(),
            zone_lookups: Vec::new(),
        }
    }

    pub fn with_zone(mut self, zone: HostedZone) -> Self {
        self.zones.push(zone);
        self
    }

    /// Answer every zone lookup, inventing a zone when none is registered.
    pub fn assuming_zones(mut self) -> Self {
        self.assume_zones = true;
        self
    }

    /// Physical id the resource resolves to instead of its lowercased
    /// logical id.
    pub fn with_physical_id(
        mut self,
        logical_id: impl Into<String>,
        physical_id: impl Into<String>,
    ) -> Self {
        self.physical_ids
            .insert(logical_id.into(), physical_id.into());
        self
    }

    /// Fail the submission of `logical_id`.
    pub fn rejecting(mut self, logical_id: impl Into<String>) -> Self {
        self.rejected.insert(logical_id.into());
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Accepted submissions, in order.
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn submitted(&self, kind: ResourceKind) -> Vec<&Submission> {
        self.submissions
            .iter()
            .filter(|submission| submission.spec.kind() == kind)
            .collect()
    }

    pub fn spec(&self, logical_id: &str) -> Option<&ResourceSpec> {
        self.submissions
            .iter()
            .find(|submission| submission.logical_id == logical_id)
            .map(|submission| &submission.spec)
    }

    /// Domain names passed to `lookup_zone`, in order.
    pub fn zone_lookups(&self) -> &[String] {
        &self.zone_lookups
    }

    fn physical_id(&self, logical_id: &str) -> String {
        self.physical_ids
            .get(logical_id)
            .cloned()
            .unwrap_or_else(|| logical_id.to_ascii_lowercase())
    }

    fn resolve(&self, logical_id: &str, region: &str, spec: &ResourceSpec) -> ResourceHandle {
        let physical = self.physical_id(logical_id);
        let handle = ResourceHandle::deferred(logical_id, spec.kind());

        match spec {
            ResourceSpec::Bucket(_) => handle
                .with_resolved(attr::ARN, format!("arn:aws:s3:::{physical}"))
                .with_resolved(
                    attr::REGIONAL_DOMAIN_NAME,
                    format!("{physical}.s3.{region}.amazonaws.com"),
                )
                .with_resolved(attr::REF, physical),
            ResourceSpec::OriginAccessIdentity(_) => handle
                .with_resolved(attr::S3_CANONICAL_USER_ID, format!("canonical-{physical}"))
                .with_resolved(attr::REF, physical),
            ResourceSpec::Certificate(_) => handle.with_resolved(
                attr::REF,
                format!("arn:aws:acm:{region}:{PLACEHOLDER_ACCOUNT}:certificate/{physical}"),
            ),
            ResourceSpec::Distribution(_) => handle
                .with_resolved(attr::DOMAIN_NAME, format!("{physical}.cloudfront.net"))
                .with_resolved(attr::REF, physical),
            ResourceSpec::DnsRecord(record) => {
                handle.with_resolved(attr::REF, record.record_name.clone())
            }
            ResourceSpec::Output(output) => handle.with_resolved(attr::REF, output.value.to_string()),
            ResourceSpec::StringParameter(parameter) => {
                handle.with_resolved(attr::REF, parameter.name.to_string())
            }
            ResourceSpec::BucketPolicy(_) | ResourceSpec::ResponseHeadersPolicy(_) => {
                handle.with_resolved(attr::REF, physical)
            }
        }
    }
}

#[async_trait]
impl ProvisioningBackend for MemoryBackend {
    async fn create_resource(
        &mut self,
        logical_id: &str,
        spec: ResourceSpec,
    ) -> StackResult<ResourceHandle> {
        if self.rejected.contains(logical_id) {
            return Err(StackError::backend(logical_id, "rejected by backend"));
        }
        if self.spec(logical_id).is_some() {
            return Err(StackError::backend(logical_id, "logical id already submitted"));
        }

        let region = spec.region().unwrap_or(&self.region).to_string();
        debug!("Accepted {} '{}' in {}", spec.kind(), logical_id, region);

        let handle = self.resolve(logical_id, &region, &spec);
        self.submissions.push(Submission {
            logical_id: logical_id.to_string(),
            region,
            spec,
        });
        Ok(handle)
    }

    async fn lookup_zone(&mut self, domain_name: &str) -> StackResult<HostedZone> {
        self.zone_lookups.push(domain_name.to_string());

        match select_zone(&self.zones, domain_name).await {
            Err(StackError::Lookup { .. }) if self.assume_zones => Ok(HostedZone::new(
                format!("{domain_name}."),
                format!("assumed-{domain_name}"),
            )),
            result => result,
        }
    }
}
