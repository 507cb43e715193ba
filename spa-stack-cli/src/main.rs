//! `spa-stack`: provision the hosting stack of a single-page application.
//!
//! ```bash
//! spa-stack --env prod plan
//! spa-stack --env prod synth --out cdk.out
//! spa-stack --env prod deploy
//! ```

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::debug;

use crate::config::EnvConfig;

#[derive(Parser)]
#[command(name = "spa-stack")]
#[command(about = "Provision a private S3 bucket behind CloudFront for a single-page application", long_about = None)]
#[command(version)]
struct Cli {
    /// Environment to provision; selects `{config-dir}/{env}.yaml`
    #[arg(long = "env", env = "SPA_STACK_ENV")]
    environment: String,

    /// Directory holding the per-environment YAML files
    #[arg(long, default_value = "./config")]
    config_dir: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the resource graph offline and print it in submission order
    Plan,

    /// Render the CloudFormation templates
    Synth {
        /// Write `{stack}.template.json` files here instead of printing them
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Synthesize and deploy the stacks, then print their outputs
    Deploy,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = EnvConfig::load(&cli.config_dir, &cli.environment)?;
    debug!(
        "Loaded {} config for account {} in {}",
        config.environment, config.aws_account_id, config.aws_region
    );

    match cli.command {
        Commands::Plan => commands::plan(&config).await,
        Commands::Synth { out } => commands::synth(&config, out.as_deref()).await,
        Commands::Deploy => commands::deploy(&config).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = i32::from(e.use_stderr());
            let _ = e.print();
            std::process::exit(code);
        }
    };
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
