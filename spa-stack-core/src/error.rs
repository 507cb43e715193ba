//! Error types shared by every stage of plan construction.

use thiserror::Error;

/// Errors that abort a provisioning run.
///
/// None of these are retried: the first failure propagates to the caller and
/// the run stops.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StackError {
    /// A required input is absent or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The apex domain could not be derived from the configured domain name.
    #[error("Cannot determine root domain: {0}")]
    Resolution(String),

    /// The hosted zone lookup found no match, or more than one.
    #[error("Hosted zone lookup failed for '{domain}': {reason}")]
    Lookup { domain: String, reason: String },

    /// The provisioning backend rejected a resource specification.
    #[error("Backend rejected resource '{logical_id}': {reason}")]
    Backend { logical_id: String, reason: String },
}

pub type StackResult<T> = Result<T, StackError>;

impl StackError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution(message.into())
    }

    pub fn lookup(domain: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Lookup {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    pub fn backend(logical_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Backend {
            logical_id: logical_id.into(),
            reason: reason.into(),
        }
    }
}
