use anyhow::{Context, Result};
use log::info;
use spa_stack_aws::CloudFormationDeployer;

use super::synthesize;
use crate::config::EnvConfig;

pub async fn deploy(config: &EnvConfig) -> Result<()> {
    let app = synthesize(config).await?;
    info!(
        "Deploying {} stack(s) to account {} in {}",
        app.stacks.len(),
        config.aws_account_id,
        config.aws_region
    );

    let deployed = CloudFormationDeployer::new(config.tags())
        .deploy_app(&app)
        .await
        .with_context(|| format!("Failed to deploy {}", config.stack_name()))?;

    let stack_name = config.stack_name();
    if let Some(outputs) = deployed.get(&stack_name) {
        for (key, value) in outputs {
            println!("{key} = {value:?}");
        }
    }
    Ok(())
}
