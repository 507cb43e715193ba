//! Validated input for one provisioning run.

use crate::error::{StackError, StackResult};

/// Validated provisioning input for one environment instance.
///
/// Built once by the configuration loader and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Prefix of every logical resource id in the stack.
    pub app_prefix: String,
    /// Application id used to derive export names.
    pub app_id: String,
    /// Name of the deployed environment (`dev`, `prod`, ...).
    pub environment: String,
    /// Fully qualified domain the site is served from.
    pub domain_name: Option<String>,
    /// Whether the distribution accepts viewer requests.
    pub enabled: bool,
    /// Whether to attach `domain_name` to the distribution with its own
    /// certificate and DNS record.
    pub create_custom_domain: bool,
}

impl SiteConfig {
    pub fn new(
        app_prefix: impl Into<String>,
        app_id: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            app_prefix: app_prefix.into(),
            app_id: app_id.into(),
            environment: environment.into(),
            domain_name: None,
            enabled: true,
            create_custom_domain: false,
        }
    }

    pub fn with_domain_name(mut self, domain_name: impl Into<String>) -> Self {
        self.domain_name = Some(domain_name.into());
        self
    }

    pub fn with_custom_domain(mut self, create_custom_domain: bool) -> Self {
        self.create_custom_domain = create_custom_domain;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// The configured domain name, treating an empty string as absent.
    pub fn domain_name(&self) -> Option<&str> {
        self.domain_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Domain name for the custom-domain branch; fails if it is missing.
    pub fn custom_domain_name(&self) -> StackResult<&str> {
        self.domain_name().ok_or_else(|| {
            StackError::configuration(
                "\"domainName\" must be set when \"createCustomDomain\" is true",
            )
        })
    }

    /// Check the fields the builder relies on.
    pub fn validate(&self) -> StackResult<()> {
        for (key, value) in [
            ("appPrefix", &self.app_prefix),
            ("appId", &self.app_id),
            ("environment", &self.environment),
        ] {
            if value.trim().is_empty() {
                return Err(StackError::configuration(format!(
                    "\"{key}\" must not be empty"
                )));
            }
        }
        if self.create_custom_domain {
            self.custom_domain_name()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_domain_requires_domain_name() {
        let config = SiteConfig::new("site", "site-app", "dev").with_custom_domain(true);
        assert!(matches!(
            config.validate(),
            Err(StackError::Configuration(_))
        ));

        let config = config.with_domain_name("app.example.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_domain_name_is_absent() {
        let config = SiteConfig::new("site", "site-app", "dev").with_domain_name("  ");
        assert_eq!(config.domain_name(), None);
        assert!(config.custom_domain_name().is_err());
    }

    #[test]
    fn test_empty_identifiers_are_rejected() {
        let config = SiteConfig::new("", "site-app", "dev");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("appPrefix"));
    }
}
