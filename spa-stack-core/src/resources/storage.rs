//! Site asset bucket and its access policy.

use super::{attr, ResourceHandle, Value};

pub const POLICY_VERSION: &str = "2012-10-17";
pub const READ_OBJECT_ACTION: &str = "s3:GetObject";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketEncryption {
    S3Managed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectOwnership {
    BucketOwnerEnforced,
}

/// What happens to the resource when the stack is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPolicy {
    Destroy,
}

/// Private bucket holding the site's build output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSpec {
    pub public_read_access: bool,
    pub block_public_access: bool,
    pub encryption: BucketEncryption,
    pub object_ownership: ObjectOwnership,
    pub removal_policy: RemovalPolicy,
}

impl BucketSpec {
    /// A bucket nobody but an explicitly granted principal can read.
    pub fn private_site_assets() -> Self {
        Self {
            public_read_access: false,
            block_public_access: true,
            encryption: BucketEncryption::S3Managed,
            object_ownership: ObjectOwnership::BucketOwnerEnforced,
            removal_policy: RemovalPolicy::Destroy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Allow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// S3 canonical user id of a CloudFront origin access identity.
    CanonicalUser(Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub effect: Effect,
    pub actions: Vec<String>,
    pub resource: Value,
    pub principal: Principal,
}

/// Resource policy document attached to the bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDocument {
    version: String,
    statements: Vec<Statement>,
}

impl PolicyDocument {
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }
}

/// Bucket policy granting object reads to the origin access identity.
///
/// The only constructor builds a document with a single statement naming a
/// single principal; there is no way to add statements afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPolicySpec {
    bucket: Value,
    document: PolicyDocument,
}

impl BucketPolicySpec {
    pub fn origin_read_only(bucket: &ResourceHandle, identity: &ResourceHandle) -> Self {
        let statement = Statement {
            effect: Effect::Allow,
            actions: vec![READ_OBJECT_ACTION.to_string()],
            resource: Value::join([bucket.attribute(attr::ARN), Value::literal("/*")]),
            principal: Principal::CanonicalUser(identity.attribute(attr::S3_CANONICAL_USER_ID)),
        };

        Self {
            bucket: bucket.reference(),
            document: PolicyDocument {
                version: POLICY_VERSION.to_string(),
                statements: vec![statement],
            },
        }
    }

    pub fn bucket(&self) -> &Value {
        &self.bucket
    }

    pub fn document(&self) -> &PolicyDocument {
        &self.document
    }

    /// Every principal the policy grants access to.
    pub fn principals(&self) -> Vec<&Principal> {
        self.document
            .statements
            .iter()
            .map(|statement| &statement.principal)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceKind;

    #[test]
    fn test_origin_read_only_grants_single_principal() {
        let bucket = ResourceHandle::deferred("siteWebsiteBucket", ResourceKind::Bucket);
        let identity =
            ResourceHandle::deferred("siteCloudFrontOAI", ResourceKind::OriginAccessIdentity);

        let policy = BucketPolicySpec::origin_read_only(&bucket, &identity);

        assert_eq!(policy.document().version(), POLICY_VERSION);
        assert_eq!(policy.document().statements().len(), 1);
        assert_eq!(
            policy.principals(),
            vec![&Principal::CanonicalUser(Value::GetAtt {
                logical_id: "siteCloudFrontOAI".into(),
                attribute: attr::S3_CANONICAL_USER_ID.into(),
            })]
        );

        let statement = &policy.document().statements()[0];
        assert_eq!(statement.actions, vec![READ_OBJECT_ACTION]);
        assert_eq!(statement.resource.references(), vec!["siteWebsiteBucket"]);
    }
}
