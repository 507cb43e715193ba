use anyhow::{Context, Result};
use log::info;
use spa_stack_core::{MemoryBackend, ProvisioningPlanBuilder};

use super::format_outputs;
use crate::config::EnvConfig;

/// Build the graph against the in-memory backend. Hosted zones are assumed
/// to exist, so this never touches AWS.
pub async fn plan(config: &EnvConfig) -> Result<()> {
    let site = config.site_config();
    let mut backend = MemoryBackend::new(&config.aws_region).assuming_zones();

    let outputs = ProvisioningPlanBuilder::new(&site)
        .build_stack(&mut backend)
        .await
        .with_context(|| format!("Failed to plan {}", config.stack_name()))?;
    info!(
        "Planned {} resources for {}",
        backend.submissions().len(),
        config.stack_name()
    );

    for submission in backend.submissions() {
        if submission.region == backend.region() {
            println!("{} {}", submission.spec.kind(), submission.logical_id);
        } else {
            println!(
                "{} {} ({})",
                submission.spec.kind(),
                submission.logical_id,
                submission.region
            );
        }
    }
    println!();
    println!("{}", format_outputs(&outputs));
    Ok(())
}
