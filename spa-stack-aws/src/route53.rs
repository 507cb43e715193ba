//! Hosted zone lookup through Route 53.

use async_trait::async_trait;
use aws_sdk_route53::Client as Route53Client;
use log::debug;
use spa_stack_core::{HostedZone, StackError, StackResult, ZoneDirectory};

use crate::{sdk_config, AwsError, AwsResult};

const HOSTED_ZONE_ID_PREFIX: &str = "/hostedzone/";
// Route 53 is a global service served from this region.
const ROUTE53_REGION: &str = "us-east-1";

/// Public hosted zones of the account, looked up by exact name.
#[derive(Debug, Clone)]
pub struct Route53Zones {
    client: Route53Client,
}

impl Route53Zones {
    pub fn new(client: Route53Client) -> Self {
        Self { client }
    }

    pub async fn from_env() -> Self {
        let config = sdk_config(ROUTE53_REGION).await;
        Self::new(Route53Client::new(&config))
    }

    async fn public_zones_named(&self, domain_name: &str) -> AwsResult<Vec<HostedZone>> {
        let dns_name = dotted(domain_name);
        let response = self
            .client
            .list_hosted_zones_by_name()
            .dns_name(&dns_name)
            .send()
            .await
            .map_err(|e| {
                AwsError::Route53Error(format!(
                    "Failed to list hosted zones named '{dns_name}': {e:?}"
                ))
            })?;

        let zones: Vec<HostedZone> = response
            .hosted_zones()
            .iter()
            .filter(|zone| zone.name().eq_ignore_ascii_case(&dns_name))
            .filter(|zone| !zone.config().is_some_and(|config| config.private_zone()))
            .map(|zone| HostedZone::new(zone.name(), strip_zone_prefix(zone.id())))
            .collect();
        debug!("Route 53 returned {} public zone(s) for {}", zones.len(), dns_name);
        Ok(zones)
    }
}

#[async_trait]
impl ZoneDirectory for Route53Zones {
    async fn find_zones(&self, domain_name: &str) -> StackResult<Vec<HostedZone>> {
        self.public_zones_named(domain_name)
            .await
            .map_err(|e| StackError::lookup(domain_name, e.to_string()))
    }
}

fn dotted(domain_name: &str) -> String {
    format!("{}.", domain_name.trim_end_matches('.'))
}

fn strip_zone_prefix(zone_id: &str) -> &str {
    zone_id.strip_prefix(HOSTED_ZONE_ID_PREFIX).unwrap_or(zone_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/hostedzone/Z123ABC", "Z123ABC")]
    #[case("Z123ABC", "Z123ABC")]
    fn test_strip_zone_prefix(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_zone_prefix(input), expected);
    }

    #[rstest]
    #[case("example.com", "example.com.")]
    #[case("example.com.", "example.com.")]
    fn test_dotted(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(dotted(input), expected);
    }
}
