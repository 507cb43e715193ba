use log::{debug, info};

use super::{CdnPlan, CustomDomain, LogicalIds, EDGE_CERTIFICATE_REGION};
use crate::backend::ProvisioningBackend;
use crate::config::SiteConfig;
use crate::domain::resolve_root_domain;
use crate::error::StackResult;
use crate::outputs::{self, StackOutputs};
use crate::resources::{
    attr, AliasRecordSpec, AllowedMethods, BucketPolicySpec, BucketSpec, CachedMethods,
    CertificateSpec, DistributionDomain, DistributionSpec, ErrorResponse,
    OriginAccessIdentitySpec, OutputSpec, ResourceHandle, ResourceSpec,
    ResponseHeadersPolicySpec, S3Origin, SecurityHeaders, StringParameterSpec, Value,
    ViewerProtocolPolicy, INDEX_DOCUMENT,
};
use crate::zone::HostedZoneLookup;

const ORIGIN_ACCESS_COMMENT: &str = "Allows CloudFront to reach the bucket";
const HEADERS_POLICY_COMMENT: &str = "Security headers response header policy";
const FALLBACK_STATUSES: [u16; 2] = [404, 403];

/// Builds the resource graph of one environment instance and submits it to
/// a backend in dependency order.
///
/// Every conditional input is checked and the hosted zone is resolved before
/// the first submission, so configuration, resolution and lookup failures
/// leave the backend untouched.
#[derive(Debug)]
pub struct ProvisioningPlanBuilder<'a> {
    config: &'a SiteConfig,
    ids: LogicalIds,
    zones: HostedZoneLookup,
}

impl<'a> ProvisioningPlanBuilder<'a> {
    pub fn new(config: &'a SiteConfig) -> Self {
        Self {
            config,
            ids: LogicalIds::new(config),
            zones: HostedZoneLookup::new(),
        }
    }

    /// Decide the shape of the CDN. Looks up the hosted zone when a custom
    /// domain is requested; submits nothing.
    pub async fn plan_cdn<B>(&mut self, backend: &mut B) -> StackResult<CdnPlan>
    where
        B: ProvisioningBackend + ?Sized,
    {
        let config = self.config;
        config.validate()?;

        if !config.create_custom_domain {
            info!("No custom domain requested, serving from the distribution domain");
            return Ok(CdnPlan::Basic);
        }

        let domain_name = config.custom_domain_name()?;
        let apex = resolve_root_domain(domain_name)?;
        info!("Custom domain {} requested, apex domain {}", domain_name, apex);

        let zone = self
            .zones
            .resolve(backend, &self.ids.root_zone(), &apex)
            .await?;

        Ok(CdnPlan::WithCustomDomain(CustomDomain {
            domain_name: domain_name.to_string(),
            zone,
            certificate_region: EDGE_CERTIFICATE_REGION.to_string(),
        }))
    }

    /// Plan and submit the CDN in front of `bucket`; returns the distribution.
    pub async fn build_cdn<B>(
        &mut self,
        backend: &mut B,
        bucket: &ResourceHandle,
    ) -> StackResult<ResourceHandle>
    where
        B: ProvisioningBackend + ?Sized,
    {
        let plan = self.plan_cdn(backend).await?;
        self.submit_cdn(backend, bucket, &plan).await
    }

    /// Submit the CDN resources of an already decided plan.
    pub async fn submit_cdn<B>(
        &self,
        backend: &mut B,
        bucket: &ResourceHandle,
        plan: &CdnPlan,
    ) -> StackResult<ResourceHandle>
    where
        B: ProvisioningBackend + ?Sized,
    {
        let identity = submit(
            backend,
            &self.ids.origin_access_identity(),
            ResourceSpec::OriginAccessIdentity(OriginAccessIdentitySpec {
                comment: ORIGIN_ACCESS_COMMENT.to_string(),
            }),
        )
        .await?;

        submit(
            backend,
            &self.ids.bucket_policy(),
            ResourceSpec::BucketPolicy(BucketPolicySpec::origin_read_only(bucket, &identity)),
        )
        .await?;

        let headers_policy = submit(
            backend,
            &self.ids.response_headers_policy(),
            ResourceSpec::ResponseHeadersPolicy(ResponseHeadersPolicySpec {
                name: self.headers_policy_name(),
                comment: HEADERS_POLICY_COMMENT.to_string(),
                security_headers: SecurityHeaders::strict(),
            }),
        )
        .await?;

        let custom_domain = match plan.custom_domain() {
            Some(custom) => {
                let certificate = submit(
                    backend,
                    &self.ids.certificate(),
                    ResourceSpec::Certificate(CertificateSpec::dns_validated(
                        custom.domain_name.clone(),
                        custom.zone.clone(),
                        custom.certificate_region.clone(),
                    )),
                )
                .await?;
                Some(DistributionDomain {
                    certificate_arn: certificate.reference(),
                    domain_names: vec![custom.domain_name.clone()],
                })
            }
            None => None,
        };

        if !self.config.enabled {
            info!("Distribution will be created disabled");
        }

        let distribution = submit(
            backend,
            &self.ids.distribution(),
            ResourceSpec::Distribution(DistributionSpec {
                enabled: self.config.enabled,
                default_root_object: INDEX_DOCUMENT.to_string(),
                origin: S3Origin {
                    id: bucket.logical_id().to_string(),
                    domain_name: bucket.attribute(attr::REGIONAL_DOMAIN_NAME),
                    origin_access_identity: identity.reference(),
                },
                viewer_protocol_policy: ViewerProtocolPolicy::RedirectToHttps,
                allowed_methods: AllowedMethods::All,
                cached_methods: CachedMethods::GetHead,
                compress: true,
                response_headers_policy: headers_policy.reference(),
                error_responses: FALLBACK_STATUSES
                    .into_iter()
                    .map(ErrorResponse::spa_fallback)
                    .collect(),
                custom_domain,
            }),
        )
        .await?;

        if let Some(custom) = plan.custom_domain() {
            submit(
                backend,
                &self.ids.alias_record(),
                ResourceSpec::DnsRecord(AliasRecordSpec {
                    record_name: custom.domain_name.clone(),
                    zone: custom.zone.clone(),
                    target_dns_name: distribution.attribute(attr::DOMAIN_NAME),
                }),
            )
            .await?;
        }

        Ok(distribution)
    }

    /// Plan and submit the whole stack, then publish its outputs.
    pub async fn build_stack<B>(&mut self, backend: &mut B) -> StackResult<StackOutputs>
    where
        B: ProvisioningBackend + ?Sized,
    {
        let plan = self.plan_cdn(backend).await?;

        let bucket = submit(
            backend,
            &self.ids.bucket(),
            ResourceSpec::Bucket(BucketSpec::private_site_assets()),
        )
        .await?;

        let distribution = self.submit_cdn(backend, &bucket, &plan).await?;

        let bucket_name = bucket.reference();
        let distribution_id = distribution.reference();
        // Without a configured domain the site is served from the
        // distribution's own domain name.
        let domain_name = match self.config.domain_name() {
            Some(domain_name) => Value::literal(domain_name),
            None => distribution.attribute(attr::DOMAIN_NAME),
        };

        let app_id = &self.config.app_id;
        for (logical_id, export_name, value) in [
            (
                self.ids.bucket_name_output(),
                outputs::bucket_export_name(app_id),
                &bucket_name,
            ),
            (
                self.ids.distribution_id_output(),
                outputs::distribution_export_name(app_id),
                &distribution_id,
            ),
            (
                self.ids.domain_name_output(),
                outputs::domain_export_name(app_id),
                &domain_name,
            ),
        ] {
            submit(
                backend,
                &logical_id,
                ResourceSpec::Output(OutputSpec {
                    export_name,
                    value: value.clone(),
                }),
            )
            .await?;
        }

        let deploy_parameters_path =
            outputs::deploy_parameters_path(&self.config.environment, domain_name.clone());
        let deploy_parameters =
            outputs::deploy_parameters_blob(bucket_name.clone(), distribution_id.clone());

        submit(
            backend,
            &self.ids.deploy_parameters(),
            ResourceSpec::StringParameter(StringParameterSpec {
                name: deploy_parameters_path.clone(),
                value: deploy_parameters.clone(),
            }),
        )
        .await?;

        Ok(StackOutputs {
            bucket_name,
            distribution_id,
            domain_name,
            deploy_parameters_path,
            deploy_parameters,
        })
    }

    // Names may contain letters, digits, hyphens and underscores.
    fn headers_policy_name(&self) -> String {
        format!(
            "{}-{}-security-headers",
            self.config.app_prefix, self.config.environment
        )
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
    }
}

async fn submit<B>(
    backend: &mut B,
    logical_id: &str,
    spec: ResourceSpec,
) -> StackResult<ResourceHandle>
where
    B: ProvisioningBackend + ?Sized,
{
    debug!("Submitting {} '{}'", spec.kind(), logical_id);
    backend.create_resource(logical_id, spec).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::resources::{HostedZone, ResourceKind};

    fn kinds(backend: &MemoryBackend) -> Vec<ResourceKind> {
        backend
            .submissions()
            .iter()
            .map(|submission| submission.spec.kind())
            .collect()
    }

    #[tokio::test]
    async fn test_custom_domain_submission_order() {
        let config = SiteConfig::new("site", "site-app", "prod")
            .with_domain_name("app.staging.example.com")
            .with_custom_domain(true);
        let mut backend = MemoryBackend::new("eu-west-1")
            .with_zone(HostedZone::new("staging.example.com.", "Z1"));

        ProvisioningPlanBuilder::new(&config)
            .build_stack(&mut backend)
            .await
            .unwrap();

        assert_eq!(
            kinds(&backend),
            vec![
                ResourceKind::Bucket,
                ResourceKind::OriginAccessIdentity,
                ResourceKind::BucketPolicy,
                ResourceKind::ResponseHeadersPolicy,
                ResourceKind::Certificate,
                ResourceKind::Distribution,
                ResourceKind::DnsRecord,
                ResourceKind::Output,
                ResourceKind::Output,
                ResourceKind::Output,
                ResourceKind::StringParameter,
            ]
        );
        assert_eq!(backend.zone_lookups(), ["staging.example.com".to_string()]);
    }

    #[tokio::test]
    async fn test_build_cdn_returns_distribution() {
        let config = SiteConfig::new("site", "site-app", "dev").with_enabled(false);
        let mut backend = MemoryBackend::new("eu-west-1");
        let bucket = ResourceHandle::deferred("siteWebsiteBucket", ResourceKind::Bucket);

        let distribution = ProvisioningPlanBuilder::new(&config)
            .build_cdn(&mut backend, &bucket)
            .await
            .unwrap();

        assert_eq!(distribution.kind(), ResourceKind::Distribution);
        match backend.spec("siteCloudFrontDistribution") {
            Some(ResourceSpec::Distribution(spec)) => {
                assert!(!spec.enabled);
                assert_eq!(
                    spec.origin.domain_name,
                    bucket.attribute(attr::REGIONAL_DOMAIN_NAME)
                );
            }
            other => panic!("unexpected distribution spec: {other:?}"),
        }
    }

    #[test]
    fn test_headers_policy_name_is_sanitized() {
        let config = SiteConfig::new("my.site", "site-app", "prod");
        let builder = ProvisioningPlanBuilder::new(&config);
        assert_eq!(builder.headers_policy_name(), "my-site-prod-security-headers");
    }
}
