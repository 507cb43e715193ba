use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use super::synthesize;
use crate::config::EnvConfig;

pub async fn synth(config: &EnvConfig, out: Option<&Path>) -> Result<()> {
    let app = synthesize(config).await?;

    for stack in &app.stacks {
        let body = stack.to_json()?;
        match out {
            Some(dir) => {
                tokio::fs::create_dir_all(dir)
                    .await
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
                let path = dir.join(format!("{}.template.json", stack.name));
                tokio::fs::write(&path, body)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Wrote {} ({}) to {}", stack.name, stack.region, path.display());
            }
            None => {
                println!("# {} ({})", stack.name, stack.region);
                println!("{body}");
            }
        }
    }
    Ok(())
}
