//! CloudFormation property rendering for each resource spec.

use serde_json::{json, Value as Json};

use crate::error::StackResult;
use crate::resources::{
    AliasRecordSpec, BucketEncryption, BucketPolicySpec, BucketSpec, CertificateSpec,
    DistributionSpec, ObjectOwnership, OriginAccessIdentitySpec, Principal, RemovalPolicy,
    ResourceSpec, ResponseHeadersPolicySpec, StringParameterSpec, Value,
};

/// Hosted zone id CloudFront alias targets always live in.
pub const CLOUDFRONT_ALIAS_ZONE_ID: &str = "Z2FDTNDATAQYW2";
/// Managed `CachingOptimized` cache policy.
pub const CACHING_OPTIMIZED_POLICY_ID: &str = "658327ea-f89d-4fab-a63d-7e88639e58f6";
const ORIGIN_ACCESS_IDENTITY_PREFIX: &str = "origin-access-identity/cloudfront/";

/// A resource ready to be placed in a template.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResource {
    pub resource_type: &'static str,
    pub properties: Json,
    pub deletion_policy: Option<&'static str>,
}

/// Render `value` as an intrinsic-function tree without any cross-stack
/// rewriting.
pub fn intrinsic(value: &Value) -> Json {
    match value {
        Value::Literal(literal) => Json::String(literal.clone()),
        Value::Ref(logical_id) => json!({ "Ref": logical_id }),
        Value::GetAtt {
            logical_id,
            attribute,
        } => json!({ "Fn::GetAtt": [logical_id, attribute] }),
        Value::Join(parts) => {
            json!({ "Fn::Join": ["", parts.iter().map(intrinsic).collect::<Vec<_>>()] })
        }
    }
}

/// Render the properties of every spec except outputs, which are not
/// resources. `resolve` turns a [`Value`] into its template form.
pub(super) fn render_resource<F>(spec: &ResourceSpec, resolve: &mut F) -> StackResult<Option<RenderedResource>>
where
    F: FnMut(&Value) -> StackResult<Json>,
{
    let kind = spec.kind();
    let Some(resource_type) = kind.cfn_type() else {
        return Ok(None);
    };

    let (properties, deletion_policy) = match spec {
        ResourceSpec::Bucket(bucket) => (bucket_properties(bucket), Some(removal(bucket))),
        ResourceSpec::OriginAccessIdentity(identity) => (origin_access_identity(identity), None),
        ResourceSpec::BucketPolicy(policy) => (bucket_policy(policy, resolve)?, None),
        ResourceSpec::ResponseHeadersPolicy(policy) => (response_headers_policy(policy), None),
        ResourceSpec::Certificate(certificate) => (certificate_properties(certificate), None),
        ResourceSpec::Distribution(distribution) => (distribution_properties(distribution, resolve)?, None),
        ResourceSpec::DnsRecord(record) => (alias_record(record, resolve)?, None),
        ResourceSpec::StringParameter(parameter) => (string_parameter(parameter, resolve)?, None),
        ResourceSpec::Output(_) => return Ok(None),
    };

    Ok(Some(RenderedResource {
        resource_type,
        properties,
        deletion_policy,
    }))
}

fn removal(bucket: &BucketSpec) -> &'static str {
    match bucket.removal_policy {
        RemovalPolicy::Destroy => "Delete",
    }
}

fn bucket_properties(bucket: &BucketSpec) -> Json {
    let algorithm = match bucket.encryption {
        BucketEncryption::S3Managed => "AES256",
    };
    let ownership = match bucket.object_ownership {
        ObjectOwnership::BucketOwnerEnforced => "BucketOwnerEnforced",
    };
    let block = bucket.block_public_access || !bucket.public_read_access;

    json!({
        "BucketEncryption": {
            "ServerSideEncryptionConfiguration": [
                { "ServerSideEncryptionByDefault": { "SSEAlgorithm": algorithm } }
            ]
        },
        "OwnershipControls": { "Rules": [{ "ObjectOwnership": ownership }] },
        "PublicAccessBlockConfiguration": {
            "BlockPublicAcls": block,
            "BlockPublicPolicy": block,
            "IgnorePublicAcls": block,
            "RestrictPublicBuckets": block
        }
    })
}

fn origin_access_identity(identity: &OriginAccessIdentitySpec) -> Json {
    json!({
        "CloudFrontOriginAccessIdentityConfig": { "Comment": identity.comment }
    })
}

fn bucket_policy<F>(policy: &BucketPolicySpec, resolve: &mut F) -> StackResult<Json>
where
    F: FnMut(&Value) -> StackResult<Json>,
{
    let mut statements = Vec::new();
    for statement in policy.document().statements() {
        let principal = match &statement.principal {
            Principal::CanonicalUser(id) => json!({ "CanonicalUser": resolve(id)? }),
        };
        statements.push(json!({
            "Effect": "Allow",
            "Action": statement.actions,
            "Resource": resolve(&statement.resource)?,
            "Principal": principal
        }));
    }

    Ok(json!({
        "Bucket": resolve(policy.bucket())?,
        "PolicyDocument": {
            "Version": policy.document().version(),
            "Statement": statements
        }
    }))
}

fn response_headers_policy(policy: &ResponseHeadersPolicySpec) -> Json {
    let headers = &policy.security_headers;
    let mut security = json!({
        "StrictTransportSecurity": {
            "AccessControlMaxAgeSec": headers.hsts_max_age_secs,
            "IncludeSubdomains": headers.hsts_include_subdomains,
            "Preload": headers.hsts_preload,
            "Override": true
        },
        "ReferrerPolicy": {
            "ReferrerPolicy": headers.referrer_policy.as_str(),
            "Override": true
        },
        "XSSProtection": {
            "Protection": headers.xss_protection,
            "ModeBlock": headers.xss_mode_block,
            "Override": true
        },
        "FrameOptions": {
            "FrameOption": headers.frame_option.as_str(),
            "Override": true
        }
    });
    if headers.content_type_nosniff {
        security["ContentTypeOptions"] = json!({ "Override": true });
    }

    json!({
        "ResponseHeadersPolicyConfig": {
            "Name": policy.name,
            "Comment": policy.comment,
            "SecurityHeadersConfig": security
        }
    })
}

fn certificate_properties(certificate: &CertificateSpec) -> Json {
    json!({
        "DomainName": certificate.domain_name(),
        "ValidationMethod": "DNS",
        "DomainValidationOptions": [{
            "DomainName": certificate.domain_name(),
            "HostedZoneId": certificate.validation_zone().zone_id
        }]
    })
}

fn distribution_properties<F>(distribution: &DistributionSpec, resolve: &mut F) -> StackResult<Json>
where
    F: FnMut(&Value) -> StackResult<Json>,
{
    let origin = &distribution.origin;
    let identity_path = Value::join([
        Value::literal(ORIGIN_ACCESS_IDENTITY_PREFIX),
        origin.origin_access_identity.clone(),
    ]);

    let error_responses: Vec<Json> = distribution
        .error_responses
        .iter()
        .map(|response| {
            json!({
                "ErrorCode": response.http_status,
                "ResponseCode": response.response_http_status,
                "ResponsePagePath": response.response_page_path,
                "ErrorCachingMinTTL": response.ttl_secs
            })
        })
        .collect();

    let mut config = json!({
        "Enabled": distribution.enabled,
        "DefaultRootObject": distribution.default_root_object,
        "HttpVersion": "http2",
        "Origins": [{
            "Id": origin.id,
            "DomainName": resolve(&origin.domain_name)?,
            "S3OriginConfig": { "OriginAccessIdentity": resolve(&identity_path)? }
        }],
        "DefaultCacheBehavior": {
            "TargetOriginId": origin.id,
            "ViewerProtocolPolicy": distribution.viewer_protocol_policy.as_str(),
            "AllowedMethods": distribution.allowed_methods.methods(),
            "CachedMethods": distribution.cached_methods.methods(),
            "Compress": distribution.compress,
            "CachePolicyId": CACHING_OPTIMIZED_POLICY_ID,
            "ResponseHeadersPolicyId": resolve(&distribution.response_headers_policy)?
        },
        "CustomErrorResponses": error_responses
    });

    if let Some(domain) = &distribution.custom_domain {
        config["Aliases"] = json!(domain.domain_names);
        config["ViewerCertificate"] = json!({
            "AcmCertificateArn": resolve(&domain.certificate_arn)?,
            "SslSupportMethod": "sni-only",
            "MinimumProtocolVersion": "TLSv1.2_2021"
        });
    }

    Ok(json!({ "DistributionConfig": config }))
}

fn alias_record<F>(record: &AliasRecordSpec, resolve: &mut F) -> StackResult<Json>
where
    F: FnMut(&Value) -> StackResult<Json>,
{
    Ok(json!({
        "Name": record.record_name,
        "Type": "A",
        "HostedZoneId": record.zone.zone_id,
        "AliasTarget": {
            "DNSName": resolve(&record.target_dns_name)?,
            "HostedZoneId": CLOUDFRONT_ALIAS_ZONE_ID
        }
    }))
}

fn string_parameter<F>(parameter: &StringParameterSpec, resolve: &mut F) -> StackResult<Json>
where
    F: FnMut(&Value) -> StackResult<Json>,
{
    Ok(json!({
        "Type": "String",
        "Name": resolve(&parameter.name)?,
        "Value": resolve(&parameter.value)?
    }))
}
