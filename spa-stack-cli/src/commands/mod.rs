//! Subcommand implementations.

mod deploy;
mod plan;
mod synth;

pub use deploy::deploy;
pub use plan::plan;
pub use synth::synth;

use anyhow::{Context, Result};
use spa_stack_aws::Route53Zones;
use spa_stack_core::{
    ProvisioningPlanBuilder, StackOutputs, StaticZones, SynthesizedApp, TemplateSynthesizer,
    ZoneDirectory,
};

use crate::config::EnvConfig;

/// Synthesize the app, consulting Route 53 only when a hosted zone is needed.
pub(crate) async fn synthesize(config: &EnvConfig) -> Result<SynthesizedApp> {
    if config.app.create_custom_domain {
        synthesize_with(config, Route53Zones::from_env().await).await
    } else {
        synthesize_with(config, StaticZones::default()).await
    }
}

async fn synthesize_with<Z: ZoneDirectory>(
    config: &EnvConfig,
    zones: Z,
) -> Result<SynthesizedApp> {
    let site = config.site_config();
    let mut synth = TemplateSynthesizer::new(config.stack_name(), &config.aws_region, zones);
    ProvisioningPlanBuilder::new(&site)
        .build_stack(&mut synth)
        .await
        .with_context(|| format!("Failed to synthesize {}", config.stack_name()))?;
    Ok(synth.finish())
}

/// `name = "value"` lines, with control characters escaped.
pub(crate) fn format_outputs(outputs: &StackOutputs) -> String {
    outputs
        .entries()
        .iter()
        .map(|(name, value)| format!("{name} = {:?}", value.to_string()))
        .collect::<Vec<_>>()
        .join("\n")
}
