//! Per-environment YAML configuration.
//!
//! `{config_dir}/{environment}.yaml`:
//!
//! ```yaml
//! awsAccountId: "123456789012"
//! awsRegion: eu-west-1
//! appPrefix: site
//! stackName: prodSiteStack   # optional
//! tags:                      # optional
//!   team: web
//! app:
//!   appId: site-app
//!   domainName: app.example.com
//!   enabled: true            # default true
//!   createCustomDomain: true # default false
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use spa_stack_core::{SiteConfig, StackError, StackResult};

pub const ENVIRONMENT_TAG: &str = "environment";
pub const PROJECT_TAG: &str = "project";

/// Account ids are often written unquoted and parse as numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(u64),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Text(text) => text,
            Scalar::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnvConfig {
    aws_account_id: Option<Scalar>,
    aws_region: Option<String>,
    app_prefix: String,
    stack_name: Option<String>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
    app: AppConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub app_id: String,
    pub domain_name: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub create_custom_domain: bool,
}

fn enabled_by_default() -> bool {
    true
}

/// Loaded configuration of one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub aws_account_id: String,
    pub aws_region: String,
    pub environment: String,
    pub app_prefix: String,
    pub app: AppConfig,
    stack_name: Option<String>,
    tags: BTreeMap<String, String>,
}

impl EnvConfig {
    /// Read `{config_dir}/{environment}.yaml`.
    pub fn load(config_dir: &Path, environment: &str) -> StackResult<Self> {
        let config_file = config_dir.join(format!("{environment}.yaml"));
        let display = config_file.display().to_string();

        let contents = std::fs::read_to_string(&config_file).map_err(|e| {
            StackError::configuration(format!("Failed to read {display}: {e}"))
        })?;
        Self::parse(&contents, environment, &display)
    }

    /// Parse YAML `contents`; `source` names the file in error messages.
    pub fn parse(contents: &str, environment: &str, source: &str) -> StackResult<Self> {
        let raw: RawEnvConfig = serde_yaml::from_str(contents)
            .map_err(|e| StackError::configuration(format!("Invalid config {source}: {e}")))?;

        let aws_account_id = raw
            .aws_account_id
            .map(Scalar::into_string)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| missing("awsAccountId", source))?;
        let aws_region = raw
            .aws_region
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| missing("awsRegion", source))?;

        Ok(Self {
            aws_account_id,
            aws_region,
            environment: environment.to_string(),
            app_prefix: raw.app_prefix,
            app: raw.app,
            stack_name: raw.stack_name,
            tags: raw.tags,
        })
    }

    pub fn site_config(&self) -> SiteConfig {
        let mut config = SiteConfig::new(&self.app_prefix, &self.app.app_id, &self.environment)
            .with_enabled(self.app.enabled)
            .with_custom_domain(self.app.create_custom_domain);
        if let Some(domain_name) = &self.app.domain_name {
            config = config.with_domain_name(domain_name);
        }
        config
    }

    pub fn stack_name(&self) -> String {
        self.stack_name
            .clone()
            .unwrap_or_else(|| format!("{}SpaStack", self.environment))
    }

    /// Configured tags plus the `environment` and `project` tags, which
    /// always win.
    pub fn tags(&self) -> BTreeMap<String, String> {
        let mut tags = self.tags.clone();
        tags.insert(ENVIRONMENT_TAG.to_string(), self.environment.clone());
        tags.insert(PROJECT_TAG.to_string(), self.app_prefix.clone());
        tags
    }
}

fn missing(key: &str, source: &str) -> StackError {
    StackError::configuration(format!("\"{key}\" is missing in {source}"))
}
