//! AWS side of the SPA edge stack:
//! - hosted zone lookup through Route 53
//! - CloudFormation deployment of synthesized templates, companion stacks first
//!

mod cloudformation;
mod error;
mod route53;

pub use cloudformation::{CloudFormationDeployer, DeployedOutputs};
pub use error::{AwsError, AwsResult};
pub use route53::Route53Zones;

use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Load the shared SDK configuration for `region` using the default
/// credential provider chain.
pub async fn sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}
