//! Exported stack outputs and the deploy-parameters blob read by the
//! deployment pipeline.
//!
//! The blob format is fixed: two `KEY=VALUE` lines joined by a single `\n`,
//! without a trailing newline.

use crate::resources::Value;

pub const BUCKET_KEY: &str = "AWS_S3_BUCKET";
pub const DISTRIBUTION_KEY: &str = "DISTRIBUTION_ID";

pub fn bucket_export_name(app_id: &str) -> String {
    format!("{app_id}-bucket-name")
}

pub fn distribution_export_name(app_id: &str) -> String {
    format!("{app_id}-distribution-id")
}

pub fn domain_export_name(app_id: &str) -> String {
    format!("{app_id}-domain-name")
}

/// `/{environment}/deploy/{domain}/env`
pub fn deploy_parameters_path(environment: &str, domain_name: Value) -> Value {
    Value::join([
        Value::literal(format!("/{environment}/deploy/")),
        domain_name,
        Value::literal("/env"),
    ])
}

/// `AWS_S3_BUCKET=<bucket>\nDISTRIBUTION_ID=<distribution>`
pub fn deploy_parameters_blob(bucket_name: Value, distribution_id: Value) -> Value {
    Value::join([
        Value::literal(format!("{BUCKET_KEY}=")),
        bucket_name,
        Value::literal(format!("\n{DISTRIBUTION_KEY}=")),
        distribution_id,
    ])
}

/// Values published by a completed plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOutputs {
    pub bucket_name: Value,
    pub distribution_id: Value,
    pub domain_name: Value,
    pub deploy_parameters_path: Value,
    pub deploy_parameters: Value,
}

impl StackOutputs {
    /// `(name, value)` pairs in display order.
    pub fn entries(&self) -> [(&'static str, &Value); 5] {
        [
            ("bucket-name", &self.bucket_name),
            ("distribution-id", &self.distribution_id),
            ("domain-name", &self.domain_name),
            ("deploy-parameters-path", &self.deploy_parameters_path),
            ("deploy-parameters", &self.deploy_parameters),
        ]
    }
}
