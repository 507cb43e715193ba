//! CloudFormation template synthesis.
//!
//! [`TemplateSynthesizer`] is a [`ProvisioningBackend`] that renders every
//! submission into the template of the region the resource belongs to.
//! Handles it returns are deferred: references become `Ref`, `Fn::GetAtt` and
//! `Fn::Join` expressions. A resource pinned to another region (the edge
//! certificate) lands in a companion stack named `{stack}-{region}`; the
//! primary stack receives the values it needs from that stack through
//! parameters fed from the companion's outputs at deploy time.

mod render;

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use log::debug;
use serde::Serialize;
use serde_json::{json, Value as Json};

use crate::backend::{select_zone, ProvisioningBackend, ZoneDirectory};
use crate::error::{StackError, StackResult};
use crate::resources::{attr, HostedZone, ResourceHandle, ResourceSpec, Value};

pub use render::{intrinsic, CACHING_OPTIMIZED_POLICY_ID, CLOUDFRONT_ALIAS_ZONE_ID};

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,
    pub description: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, TemplateParameter>,
    pub resources: BTreeMap<String, TemplateResource>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, TemplateOutput>,
}

impl Template {
    fn new(description: String) -> Self {
        Self {
            format_version: TEMPLATE_FORMAT_VERSION.to_string(),
            description,
            parameters: BTreeMap::new(),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateParameter {
    #[serde(rename = "Type")]
    pub parameter_type: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateResource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    pub properties: Json,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateOutput {
    pub value: Json,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<OutputExport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputExport {
    pub name: String,
}

/// Where a stack parameter takes its value from at deploy time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSource {
    pub stack_name: String,
    pub output_key: String,
}

/// One deployable stack.
#[derive(Debug, Clone, PartialEq)]
pub struct StackTemplate {
    pub name: String,
    pub region: String,
    pub template: Template,
    /// Parameter name to the output that feeds it.
    pub parameter_sources: BTreeMap<String, ParameterSource>,
}

impl StackTemplate {
    pub fn to_json(&self) -> StackResult<String> {
        serde_json::to_string_pretty(&self.template)
            .map_err(|e| StackError::backend(&self.name, format!("cannot serialize template: {e}")))
    }
}

/// All stacks of one app, in deployment order.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedApp {
    pub stacks: Vec<StackTemplate>,
}

impl SynthesizedApp {
    pub fn stack(&self, name: &str) -> Option<&StackTemplate> {
        self.stacks.iter().find(|stack| stack.name == name)
    }
}

/// Backend that writes CloudFormation templates instead of creating
/// anything. Zone lookups go to the [`ZoneDirectory`].
#[derive(Debug)]
pub struct TemplateSynthesizer<Z> {
    stack_name: String,
    primary_region: String,
    zones: Z,
    templates: BTreeMap<String, Template>,
    placement: HashMap<String, String>,
    parameter_sources: BTreeMap<String, ParameterSource>,
}

impl<Z: ZoneDirectory> TemplateSynthesizer<Z> {
    pub fn new(stack_name: impl Into<String>, primary_region: impl Into<String>, zones: Z) -> Self {
        let stack_name = stack_name.into();
        let primary_region = primary_region.into();
        let mut templates = BTreeMap::new();
        templates.insert(
            primary_region.clone(),
            Template::new(format!("{stack_name}: single-page application hosting")),
        );

        Self {
            stack_name,
            primary_region,
            zones,
            templates,
            placement: HashMap::new(),
            parameter_sources: BTreeMap::new(),
        }
    }

    /// Name of the stack deployed to `region`.
    pub fn stack_name_for(&self, region: &str) -> String {
        if region == self.primary_region {
            self.stack_name.clone()
        } else {
            format!("{}-{region}", self.stack_name)
        }
    }

    /// Companion stacks first, the primary stack last.
    pub fn finish(mut self) -> SynthesizedApp {
        let primary = self.templates.remove(&self.primary_region);
        let mut stacks: Vec<StackTemplate> = std::mem::take(&mut self.templates)
            .into_iter()
            .map(|(region, template)| StackTemplate {
                name: self.stack_name_for(&region),
                region,
                template,
                parameter_sources: BTreeMap::new(),
            })
            .collect();

        if let Some(template) = primary {
            stacks.push(StackTemplate {
                name: self.stack_name.clone(),
                region: self.primary_region.clone(),
                template,
                parameter_sources: std::mem::take(&mut self.parameter_sources),
            });
        }

        SynthesizedApp { stacks }
    }

    fn template_mut(&mut self, region: &str) -> &mut Template {
        let description = format!("{}: resources pinned to {region}", self.stack_name);
        self.templates
            .entry(region.to_string())
            .or_insert_with(|| Template::new(description))
    }

    /// Render `value` for a resource in `consumer_region`, wiring references
    /// to other regions through an output and a parameter.
    fn resolve(&mut self, consumer_id: &str, consumer_region: &str, value: &Value) -> StackResult<Json> {
        match value {
            Value::Literal(_) => Ok(intrinsic(value)),
            Value::Ref(logical_id) => {
                self.resolve_reference(consumer_id, consumer_region, value, logical_id, attr::REF)
            }
            Value::GetAtt {
                logical_id,
                attribute,
            } => self.resolve_reference(consumer_id, consumer_region, value, logical_id, attribute),
            Value::Join(parts) => {
                let mut rendered = Vec::with_capacity(parts.len());
                for part in parts {
                    rendered.push(self.resolve(consumer_id, consumer_region, part)?);
                }
                Ok(json!({ "Fn::Join": ["", rendered] }))
            }
        }
    }

    fn resolve_reference(
        &mut self,
        consumer_id: &str,
        consumer_region: &str,
        value: &Value,
        producer_id: &str,
        attribute: &str,
    ) -> StackResult<Json> {
        let Some(producer_region) = self.placement.get(producer_id).cloned() else {
            return Err(StackError::backend(
                consumer_id,
                format!("references undeclared resource '{producer_id}'"),
            ));
        };

        if producer_region == consumer_region {
            return Ok(intrinsic(value));
        }
        if consumer_region != self.primary_region {
            return Err(StackError::backend(
                consumer_id,
                format!(
                    "cannot reference '{producer_id}' in {producer_region} from {consumer_region}"
                ),
            ));
        }

        let name = format!("{producer_id}{attribute}");
        let producer_stack = self.stack_name_for(&producer_region);
        debug!(
            "Passing {} from {} to {} as a parameter",
            name, producer_stack, self.stack_name
        );

        self.template_mut(&producer_region).outputs.insert(
            name.clone(),
            TemplateOutput {
                value: intrinsic(value),
                export: None,
            },
        );
        let description = format!("{attribute} of {producer_id} in {producer_stack}");
        self.template_mut(consumer_region).parameters.insert(
            name.clone(),
            TemplateParameter {
                parameter_type: "String".to_string(),
                description,
            },
        );
        self.parameter_sources.insert(
            name.clone(),
            ParameterSource {
                stack_name: producer_stack,
                output_key: name.clone(),
            },
        );

        Ok(json!({ "Ref": name }))
    }
}

#[async_trait]
impl<Z: ZoneDirectory> ProvisioningBackend for TemplateSynthesizer<Z> {
    async fn create_resource(
        &mut self,
        logical_id: &str,
        spec: ResourceSpec,
    ) -> StackResult<ResourceHandle> {
        if self.placement.contains_key(logical_id) {
            return Err(StackError::backend(logical_id, "logical id already submitted"));
        }

        let region = spec.region().unwrap_or(&self.primary_region).to_string();
        let mut resolve = |value: &Value| self.resolve(logical_id, &region, value);

        if let ResourceSpec::Output(output) = &spec {
            let value = resolve(&output.value)?;
            self.template_mut(&region).outputs.insert(
                logical_id.to_string(),
                TemplateOutput {
                    value,
                    export: Some(OutputExport {
                        name: output.export_name.clone(),
                    }),
                },
            );
        } else if let Some(rendered) = render::render_resource(&spec, &mut resolve)? {
            let policy = rendered.deletion_policy.map(str::to_string);
            self.template_mut(&region).resources.insert(
                logical_id.to_string(),
                TemplateResource {
                    resource_type: rendered.resource_type.to_string(),
                    properties: rendered.properties,
                    deletion_policy: policy.clone(),
                    update_replace_policy: policy,
                },
            );
        }

        debug!("Rendered {} '{}' into the {} template", spec.kind(), logical_id, region);
        self.placement.insert(logical_id.to_string(), region);
        Ok(ResourceHandle::deferred(logical_id, spec.kind()))
    }

    async fn lookup_zone(&mut self, domain_name: &str) -> StackResult<HostedZone> {
        select_zone(&self.zones, domain_name).await
    }
}
