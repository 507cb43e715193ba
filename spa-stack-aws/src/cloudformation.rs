//! CloudFormation deployment of synthesized stacks.
//!
//! Stacks are deployed in the order the synthesizer produced them. Each one
//! is created when missing and updated otherwise, then polled until it
//! settles. Outputs of finished stacks feed the parameters of later ones.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use aws_sdk_cloudformation::types::{OnFailure, Parameter, Tag};
use aws_sdk_cloudformation::Client as CfnClient;
use log::{debug, info};
use spa_stack_core::{StackTemplate, SynthesizedApp};

use crate::{sdk_config, AwsError, AwsResult};

const NO_UPDATES: &str = "No updates are to be performed";
const DOES_NOT_EXIST: &str = "does not exist";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Outputs of every deployed stack, keyed by stack name.
pub type DeployedOutputs = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackState {
    InProgress,
    Succeeded,
    Failed,
}

fn classify(status: &str) -> StackState {
    match status {
        "CREATE_COMPLETE" | "UPDATE_COMPLETE" | "IMPORT_COMPLETE" => StackState::Succeeded,
        s if s.ends_with("_IN_PROGRESS") => StackState::InProgress,
        _ => StackState::Failed,
    }
}

/// Status decision when CloudFormation reported nothing to update. A stack
/// that rolled back an earlier update is stable and still serves the last
/// good template, so it counts as settled.
fn settled_after_no_update(status: &str) -> StackState {
    match status {
        "UPDATE_ROLLBACK_COMPLETE" | "IMPORT_ROLLBACK_COMPLETE" => StackState::Succeeded,
        s => classify(s),
    }
}

/// Deploys synthesized stacks, one CloudFormation client per region.
pub struct CloudFormationDeployer {
    clients: HashMap<String, CfnClient>,
    tags: BTreeMap<String, String>,
    poll_interval: Duration,
}

impl CloudFormationDeployer {
    /// `tags` are applied to every stack and propagate to its resources.
    pub fn new(tags: BTreeMap<String, String>) -> Self {
        Self {
            clients: HashMap::new(),
            tags,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Deploy every stack of `app` in order and return their outputs.
    pub async fn deploy_app(&mut self, app: &SynthesizedApp) -> AwsResult<DeployedOutputs> {
        let mut deployed = DeployedOutputs::new();
        for stack in &app.stacks {
            let parameters = stack_parameters(stack, &deployed)?;
            let outputs = self.deploy_stack(stack, parameters).await?;
            deployed.insert(stack.name.clone(), outputs);
        }
        Ok(deployed)
    }

    /// Create or update one stack and wait for it to settle.
    pub async fn deploy_stack(
        &mut self,
        stack: &StackTemplate,
        parameters: BTreeMap<String, String>,
    ) -> AwsResult<BTreeMap<String, String>> {
        let body = stack
            .to_json()
            .map_err(|e| AwsError::TemplateError(e.to_string()))?;
        let tags = self.stack_tags()?;
        let parameters: Vec<Parameter> = parameters
            .into_iter()
            .map(|(key, value)| {
                Parameter::builder()
                    .parameter_key(key)
                    .parameter_value(value)
                    .build()
            })
            .collect();

        let client = self.client(&stack.region).await;
        let mut settled: fn(&str) -> StackState = classify;

        if stack_exists(&client, &stack.name).await? {
            info!("Updating stack {} in {}", stack.name, stack.region);
            let result = client
                .update_stack()
                .stack_name(&stack.name)
                .template_body(&body)
                .set_parameters(Some(parameters))
                .set_tags(Some(tags))
                .send()
                .await;
            if let Err(e) = result {
                let message = format!("{e:?}");
                if !message.contains(NO_UPDATES) {
                    return Err(AwsError::CloudFormationError(format!(
                        "Failed to update stack '{}': {message}",
                        stack.name
                    )));
                }
                info!("Stack {} is already up to date", stack.name);
                settled = settled_after_no_update;
            }
        } else {
            info!("Creating stack {} in {}", stack.name, stack.region);
            client
                .create_stack()
                .stack_name(&stack.name)
                .template_body(&body)
                .set_parameters(Some(parameters))
                .set_tags(Some(tags))
                .on_failure(OnFailure::Delete)
                .send()
                .await
                .map_err(|e| {
                    AwsError::CloudFormationError(format!(
                        "Failed to create stack '{}': {e:?}",
                        stack.name
                    ))
                })?;
        }

        self.wait_for_stack(&client, &stack.name, settled).await
    }

    async fn client(&mut self, region: &str) -> CfnClient {
        if let Some(client) = self.clients.get(region) {
            return client.clone();
        }
        let config = sdk_config(region).await;
        let client = CfnClient::new(&config);
        self.clients.insert(region.to_string(), client.clone());
        client
    }

    fn stack_tags(&self) -> AwsResult<Vec<Tag>> {
        self.tags
            .iter()
            .map(|(key, value)| {
                Ok(Tag::builder().key(key).value(value).build())
            })
            .collect()
    }

    async fn wait_for_stack(
        &self,
        client: &CfnClient,
        name: &str,
        settled: fn(&str) -> StackState,
    ) -> AwsResult<BTreeMap<String, String>> {
        loop {
            let response = client
                .describe_stacks()
                .stack_name(name)
                .send()
                .await
                .map_err(|e| {
                    AwsError::CloudFormationError(format!(
                        "Failed to describe stack '{name}': {e:?}"
                    ))
                })?;
            let Some(stack) = response.stacks().first() else {
                return Err(AwsError::CloudFormationError(format!(
                    "Stack '{name}' not found"
                )));
            };
            let status = stack
                .stack_status()
                .map(|status| status.as_str().to_string())
                .unwrap_or_default();

            match settled(&status) {
                StackState::InProgress => {
                    debug!("Stack {} is {}", name, status);
                    tokio::time::sleep(self.poll_interval).await;
                }
                StackState::Succeeded => {
                    info!("Stack {} reached {}", name, status);
                    return Ok(stack
                        .outputs()
                        .iter()
                        .filter_map(|output| {
                            Some((
                                output.output_key()?.to_string(),
                                output.output_value()?.to_string(),
                            ))
                        })
                        .collect());
                }
                StackState::Failed => {
                    return Err(AwsError::StackFailed {
                        stack: name.to_string(),
                        status,
                        reason: stack
                            .stack_status_reason()
                            .unwrap_or("no status reason reported")
                            .to_string(),
                    })
                }
            }
        }
    }
}

async fn stack_exists(client: &CfnClient, name: &str) -> AwsResult<bool> {
    match client.describe_stacks().stack_name(name).send().await {
        Ok(_) => Ok(true),
        Err(e) => {
            let message = format!("{e:?}");
            if message.contains(DOES_NOT_EXIST) {
                Ok(false)
            } else {
                Err(AwsError::CloudFormationError(format!(
                    "Failed to describe stack '{name}': {message}"
                )))
            }
        }
    }
}

/// Values for the parameters of `stack`, taken from already deployed stacks.
fn stack_parameters(
    stack: &StackTemplate,
    deployed: &DeployedOutputs,
) -> AwsResult<BTreeMap<String, String>> {
    stack
        .parameter_sources
        .iter()
        .map(|(parameter, source)| {
            deployed
                .get(&source.stack_name)
                .and_then(|outputs| outputs.get(&source.output_key))
                .map(|value| (parameter.clone(), value.clone()))
                .ok_or_else(|| {
                    AwsError::TemplateError(format!(
                        "Parameter '{parameter}' of stack '{}' needs output '{}' of stack '{}', which has not been deployed",
                        stack.name, source.output_key, source.stack_name
                    ))
                })
        })
        .collect()
}
