//! Conditional resource graph construction.

mod builder;

pub use builder::ProvisioningPlanBuilder;

use crate::config::SiteConfig;
use crate::resources::HostedZone;

/// Region every CloudFront viewer certificate has to be issued in.
pub const EDGE_CERTIFICATE_REGION: &str = "us-east-1";

/// What the CDN part of the stack looks like, decided before anything is
/// submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CdnPlan {
    /// Distribution reachable only through its generated domain name.
    Basic,
    /// Distribution with its own certificate and alias record.
    WithCustomDomain(CustomDomain),
}

impl CdnPlan {
    pub fn custom_domain(&self) -> Option<&CustomDomain> {
        match self {
            CdnPlan::Basic => None,
            CdnPlan::WithCustomDomain(custom) => Some(custom),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomDomain {
    pub domain_name: String,
    /// Existing zone of the apex domain; holds both the certificate
    /// validation records and the alias record.
    pub zone: HostedZone,
    pub certificate_region: String,
}

/// Logical ids of everything one stack instance contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalIds {
    prefix: String,
    app_id: String,
}

impl LogicalIds {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            prefix: alphanumeric(&config.app_prefix),
            app_id: alphanumeric(&config.app_id),
        }
    }

    fn id(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.prefix)
    }

    pub fn bucket(&self) -> String {
        self.id("WebsiteBucket")
    }

    pub fn bucket_policy(&self) -> String {
        self.id("WebsiteBucketPolicy")
    }

    pub fn origin_access_identity(&self) -> String {
        self.id("CloudFrontOAI")
    }

    pub fn response_headers_policy(&self) -> String {
        self.id("ResponseHeaderPolicy")
    }

    pub fn root_zone(&self) -> String {
        self.id("RootHz")
    }

    pub fn certificate(&self) -> String {
        self.id("WebsiteCertificate")
    }

    pub fn distribution(&self) -> String {
        self.id("CloudFrontDistribution")
    }

    pub fn alias_record(&self) -> String {
        self.id("CloudfrontARecord")
    }

    pub fn bucket_name_output(&self) -> String {
        self.id("BucketName")
    }

    pub fn distribution_id_output(&self) -> String {
        self.id("CloudfrontId")
    }

    pub fn domain_name_output(&self) -> String {
        self.id("DomainName")
    }

    pub fn deploy_parameters(&self) -> String {
        self.id(&format!("{}DeployParams", self.app_id))
    }
}

// CloudFormation logical ids are restricted to [A-Za-z0-9].
fn alphanumeric(value: &str) -> String {
    value.chars().filter(char::is_ascii_alphanumeric).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_ids_strip_separators() {
        let config = SiteConfig::new("my-site", "site_app", "dev");
        let ids = LogicalIds::new(&config);
        assert_eq!(ids.bucket(), "mysiteWebsiteBucket");
        assert_eq!(ids.deploy_parameters(), "mysitesiteappDeployParams");
    }
}
