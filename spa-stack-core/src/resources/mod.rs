//! Typed resource specifications and the references that wire them together.
//!
//! Every resource the plan builder submits is described by a [`ResourceSpec`].
//! Specs refer to each other through [`Value`]s taken from the
//! [`ResourceHandle`] the backend returned for an earlier submission, so a
//! value is either already known (in-memory backend) or a deferred reference
//! the backend resolves itself (template synthesis).

mod dns;
mod edge;
mod exports;
mod storage;

use std::collections::BTreeMap;
use std::fmt;

pub use dns::{AliasRecordSpec, HostedZone};
pub use edge::{
    AllowedMethods, CachedMethods, CertificateSpec, DistributionDomain, DistributionSpec,
    ErrorResponse, FrameOption, OriginAccessIdentitySpec, ReferrerPolicy,
    ResponseHeadersPolicySpec, S3Origin, SecurityHeaders, ViewerProtocolPolicy, INDEX_DOCUMENT,
};
pub use exports::{OutputSpec, StringParameterSpec};
pub use storage::{
    BucketEncryption, BucketPolicySpec, BucketSpec, Effect, ObjectOwnership, PolicyDocument,
    Principal, RemovalPolicy, Statement,
};

/// Attribute names exposed by resource handles.
pub mod attr {
    /// The value a plain reference to the resource resolves to.
    pub const REF: &str = "Ref";
    pub const ARN: &str = "Arn";
    pub const REGIONAL_DOMAIN_NAME: &str = "RegionalDomainName";
    pub const S3_CANONICAL_USER_ID: &str = "S3CanonicalUserId";
    pub const DOMAIN_NAME: &str = "DomainName";
}

/// A string whose content may only be known once the backend has created
/// the resources it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Literal(String),
    /// Primary identifier of another resource.
    Ref(String),
    /// Named attribute of another resource.
    GetAtt {
        logical_id: String,
        attribute: String,
    },
    /// Concatenation of its parts.
    Join(Vec<Value>),
}

impl Value {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    /// Concatenate parts, merging adjacent literals.
    ///
    /// A join made only of literals collapses into a single literal.
    pub fn join(parts: impl IntoIterator<Item = Value>) -> Self {
        let mut merged: Vec<Value> = Vec::new();
        for part in parts {
            let flattened = match part {
                Value::Join(inner) => inner,
                other => vec![other],
            };
            for piece in flattened {
                if let Value::Literal(next) = &piece {
                    if let Some(Value::Literal(previous)) = merged.last_mut() {
                        previous.push_str(next);
                        continue;
                    }
                }
                merged.push(piece);
            }
        }

        match merged.len() {
            0 => Value::Literal(String::new()),
            1 => merged.remove(0),
            _ => Value::Join(merged),
        }
    }

    /// The literal content, if nothing in the value is deferred.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Value::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// Logical ids this value depends on, in order of appearance.
    pub fn references(&self) -> Vec<&str> {
        match self {
            Value::Literal(_) => Vec::new(),
            Value::Ref(logical_id) | Value::GetAtt { logical_id, .. } => vec![logical_id],
            Value::Join(parts) => parts.iter().flat_map(Value::references).collect(),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Literal(value) => write!(f, "{value}"),
            Value::Ref(logical_id) => write!(f, "${{{logical_id}}}"),
            Value::GetAtt {
                logical_id,
                attribute,
            } => write!(f, "${{{logical_id}.{attribute}}}"),
            Value::Join(parts) => parts.iter().try_for_each(|part| write!(f, "{part}")),
        }
    }
}

/// Kind of a submitted resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Bucket,
    OriginAccessIdentity,
    BucketPolicy,
    ResponseHeadersPolicy,
    Certificate,
    Distribution,
    DnsRecord,
    Output,
    StringParameter,
}

impl ResourceKind {
    /// CloudFormation resource type; outputs are not resources.
    pub fn cfn_type(self) -> Option<&'static str> {
        match self {
            ResourceKind::Bucket => Some("AWS::S3::Bucket"),
            ResourceKind::OriginAccessIdentity => {
                Some("AWS::CloudFront::CloudFrontOriginAccessIdentity")
            }
            ResourceKind::BucketPolicy => Some("AWS::S3::BucketPolicy"),
            ResourceKind::ResponseHeadersPolicy => Some("AWS::CloudFront::ResponseHeadersPolicy"),
            ResourceKind::Certificate => Some("AWS::CertificateManager::Certificate"),
            ResourceKind::Distribution => Some("AWS::CloudFront::Distribution"),
            ResourceKind::DnsRecord => Some("AWS::Route53::RecordSet"),
            ResourceKind::StringParameter => Some("AWS::SSM::Parameter"),
            ResourceKind::Output => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Bucket => "bucket",
            ResourceKind::OriginAccessIdentity => "origin-access-identity",
            ResourceKind::BucketPolicy => "bucket-policy",
            ResourceKind::ResponseHeadersPolicy => "response-headers-policy",
            ResourceKind::Certificate => "certificate",
            ResourceKind::Distribution => "distribution",
            ResourceKind::DnsRecord => "dns-record",
            ResourceKind::Output => "output",
            ResourceKind::StringParameter => "string-parameter",
        };
        f.write_str(name)
    }
}

/// Specification of one resource submitted to the provisioning backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceSpec {
    Bucket(BucketSpec),
    OriginAccessIdentity(OriginAccessIdentitySpec),
    BucketPolicy(BucketPolicySpec),
    ResponseHeadersPolicy(ResponseHeadersPolicySpec),
    Certificate(CertificateSpec),
    Distribution(DistributionSpec),
    DnsRecord(AliasRecordSpec),
    Output(OutputSpec),
    StringParameter(StringParameterSpec),
}

impl ResourceSpec {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceSpec::Bucket(_) => ResourceKind::Bucket,
            ResourceSpec::OriginAccessIdentity(_) => ResourceKind::OriginAccessIdentity,
            ResourceSpec::BucketPolicy(_) => ResourceKind::BucketPolicy,
            ResourceSpec::ResponseHeadersPolicy(_) => ResourceKind::ResponseHeadersPolicy,
            ResourceSpec::Certificate(_) => ResourceKind::Certificate,
            ResourceSpec::Distribution(_) => ResourceKind::Distribution,
            ResourceSpec::DnsRecord(_) => ResourceKind::DnsRecord,
            ResourceSpec::Output(_) => ResourceKind::Output,
            ResourceSpec::StringParameter(_) => ResourceKind::StringParameter,
        }
    }

    /// Region the resource must be created in, when pinned.
    pub fn region(&self) -> Option<&str> {
        match self {
            ResourceSpec::Certificate(spec) => Some(spec.region()),
            _ => None,
        }
    }
}

/// Handle to a resource the backend accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    logical_id: String,
    kind: ResourceKind,
    resolved: BTreeMap<String, String>,
}

impl ResourceHandle {
    /// A handle whose attributes are resolved later by the backend.
    pub fn deferred(logical_id: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            logical_id: logical_id.into(),
            kind,
            resolved: BTreeMap::new(),
        }
    }

    /// Record a known attribute value; use [`attr::REF`] for the reference itself.
    pub fn with_resolved(mut self, attribute: &str, value: impl Into<String>) -> Self {
        self.resolved.insert(attribute.to_string(), value.into());
        self
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Reference to the resource's primary identifier.
    pub fn reference(&self) -> Value {
        match self.resolved.get(attr::REF) {
            Some(value) => Value::literal(value.clone()),
            None => Value::Ref(self.logical_id.clone()),
        }
    }

    pub fn attribute(&self, attribute: &str) -> Value {
        match self.resolved.get(attribute) {
            Some(value) => Value::literal(value.clone()),
            None => Value::GetAtt {
                logical_id: self.logical_id.clone(),
                attribute: attribute.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_collapses_literals() {
        let joined = Value::join([
            Value::literal("AWS_S3_BUCKET="),
            Value::literal("b1"),
            Value::literal("\nDISTRIBUTION_ID="),
            Value::literal("d1"),
        ]);
        assert_eq!(joined.as_literal(), Some("AWS_S3_BUCKET=b1\nDISTRIBUTION_ID=d1"));
    }

    #[test]
    fn test_join_keeps_deferred_parts() {
        let joined = Value::join([
            Value::literal("arn:"),
            Value::literal("aws"),
            Value::Ref("Bucket".into()),
            Value::join([Value::literal("/"), Value::literal("*")]),
        ]);
        assert_eq!(
            joined,
            Value::Join(vec![
                Value::literal("arn:aws"),
                Value::Ref("Bucket".into()),
                Value::literal("/*"),
            ])
        );
        assert_eq!(joined.references(), vec!["Bucket"]);
        assert_eq!(joined.to_string(), "arn:aws${Bucket}/*");
    }

    #[test]
    fn test_handle_prefers_resolved_attributes() {
        let handle = ResourceHandle::deferred("Site", ResourceKind::Bucket)
            .with_resolved(attr::REF, "site-bucket");
        assert_eq!(handle.reference(), Value::literal("site-bucket"));
        assert_eq!(
            handle.attribute(attr::ARN),
            Value::GetAtt {
                logical_id: "Site".into(),
                attribute: attr::ARN.into(),
            }
        );
    }
}
