//! Resource graph construction for a single-page application served from a
//! private S3 bucket behind CloudFront, with an optional custom domain.
//!
//! The [`ProvisioningPlanBuilder`] turns a [`SiteConfig`] into resource
//! specifications and submits them, in dependency order, to any
//! [`ProvisioningBackend`]. Two backends ship with this crate:
//! [`MemoryBackend`], which resolves everything immediately, and
//! [`TemplateSynthesizer`], which renders CloudFormation templates.

pub mod backend;
pub mod config;
pub mod domain;
pub mod error;
pub mod outputs;
pub mod plan;
pub mod resources;
pub mod template;
pub mod zone;

pub use backend::{MemoryBackend, ProvisioningBackend, StaticZones, Submission, ZoneDirectory};
pub use config::SiteConfig;
pub use domain::{resolve_root_domain, root_domain};
pub use error::{StackError, StackResult};
pub use outputs::StackOutputs;
pub use plan::{CdnPlan, CustomDomain, LogicalIds, ProvisioningPlanBuilder, EDGE_CERTIFICATE_REGION};
pub use resources::{HostedZone, ResourceHandle, ResourceKind, ResourceSpec, Value};
pub use template::{StackTemplate, SynthesizedApp, TemplateSynthesizer};
pub use zone::HostedZoneLookup;
