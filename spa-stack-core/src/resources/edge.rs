//! CDN-side resources: origin access identity, security headers, the
//! distribution and its certificate.

use super::{HostedZone, Value};

/// Two years, the HSTS preload list minimum.
pub const HSTS_MAX_AGE_SECS: u64 = 2 * 365 * 24 * 60 * 60;

/// Error-caching TTL of the SPA fallback responses.
pub const FALLBACK_TTL_SECS: u64 = 10;

pub const INDEX_DOCUMENT: &str = "index.html";

/// Identity CloudFront uses to fetch objects from the private bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginAccessIdentitySpec {
    pub comment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferrerPolicy {
    StrictOriginWhenCrossOrigin,
}

impl ReferrerPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            ReferrerPolicy::StrictOriginWhenCrossOrigin => "strict-origin-when-cross-origin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOption {
    Deny,
}

impl FrameOption {
    pub fn as_str(self) -> &'static str {
        match self {
            FrameOption::Deny => "DENY",
        }
    }
}

/// Security headers added to every response. Each one overrides whatever
/// the origin sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityHeaders {
    pub hsts_max_age_secs: u64,
    pub hsts_include_subdomains: bool,
    pub hsts_preload: bool,
    pub content_type_nosniff: bool,
    pub referrer_policy: ReferrerPolicy,
    pub xss_protection: bool,
    pub xss_mode_block: bool,
    pub frame_option: FrameOption,
}

impl SecurityHeaders {
    pub fn strict() -> Self {
        Self {
            hsts_max_age_secs: HSTS_MAX_AGE_SECS,
            hsts_include_subdomains: true,
            hsts_preload: true,
            content_type_nosniff: true,
            referrer_policy: ReferrerPolicy::StrictOriginWhenCrossOrigin,
            xss_protection: true,
            xss_mode_block: true,
            frame_option: FrameOption::Deny,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHeadersPolicySpec {
    /// Account-unique policy name.
    pub name: String,
    pub comment: String,
    pub security_headers: SecurityHeaders,
}

/// TLS certificate validated through DNS records in an existing zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateSpec {
    domain_name: String,
    validation_zone: HostedZone,
    region: String,
}

impl CertificateSpec {
    /// The region is required: edge certificates live in a fixed region no
    /// matter where the rest of the stack is deployed.
    pub fn dns_validated(
        domain_name: impl Into<String>,
        validation_zone: HostedZone,
        region: impl Into<String>,
    ) -> Self {
        Self {
            domain_name: domain_name.into(),
            validation_zone,
            region: region.into(),
        }
    }

    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }

    pub fn validation_zone(&self) -> &HostedZone {
        &self.validation_zone
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerProtocolPolicy {
    RedirectToHttps,
}

impl ViewerProtocolPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewerProtocolPolicy::RedirectToHttps => "redirect-to-https",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowedMethods {
    All,
}

impl AllowedMethods {
    pub fn methods(self) -> &'static [&'static str] {
        match self {
            AllowedMethods::All => &["GET", "HEAD", "OPTIONS", "PUT", "PATCH", "POST", "DELETE"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachedMethods {
    GetHead,
}

impl CachedMethods {
    pub fn methods(self) -> &'static [&'static str] {
        match self {
            CachedMethods::GetHead => &["GET", "HEAD"],
        }
    }
}

/// Maps an origin error status to the application entry document so the
/// client-side router can handle the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub http_status: u16,
    pub response_http_status: u16,
    pub response_page_path: String,
    pub ttl_secs: u64,
}

impl ErrorResponse {
    pub fn spa_fallback(http_status: u16) -> Self {
        Self {
            http_status,
            response_http_status: 200,
            response_page_path: format!("/{INDEX_DOCUMENT}"),
            ttl_secs: FALLBACK_TTL_SECS,
        }
    }
}

/// Bucket origin reached through the origin access identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Origin {
    pub id: String,
    pub domain_name: Value,
    pub origin_access_identity: Value,
}

/// Certificate and alternate domain names of a distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionDomain {
    pub certificate_arn: Value,
    pub domain_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionSpec {
    pub enabled: bool,
    pub default_root_object: String,
    pub origin: S3Origin,
    pub viewer_protocol_policy: ViewerProtocolPolicy,
    pub allowed_methods: AllowedMethods,
    pub cached_methods: CachedMethods,
    pub compress: bool,
    pub response_headers_policy: Value,
    pub error_responses: Vec<ErrorResponse>,
    /// Present only when the site has its own domain.
    pub custom_domain: Option<DistributionDomain>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spa_fallback_serves_index() {
        let response = ErrorResponse::spa_fallback(403);
        assert_eq!(response.http_status, 403);
        assert_eq!(response.response_http_status, 200);
        assert_eq!(response.response_page_path, "/index.html");
        assert_eq!(response.ttl_secs, 10);
    }

    #[test]
    fn test_strict_headers_use_two_year_hsts() {
        let headers = SecurityHeaders::strict();
        assert_eq!(headers.hsts_max_age_secs, 63_072_000);
        assert!(headers.hsts_include_subdomains && headers.hsts_preload);
        assert_eq!(headers.frame_option.as_str(), "DENY");
    }
}
