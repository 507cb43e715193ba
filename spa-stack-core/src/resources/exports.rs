//! Stack outputs and the SSM parameter carrying deploy settings.

use super::Value;

/// Stack output exported under a name other stacks can import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    pub export_name: String,
    pub value: Value,
}

/// Plain string parameter in the parameter store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringParameterSpec {
    pub name: Value,
    pub value: Value,
}
