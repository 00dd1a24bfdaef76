//! Configuration validation utilities

use super::error::{ValidationError, ValidationErrorKind};
use super::schema::HubConfig;
use std::collections::HashSet;

/// Configuration validator with cross-field rules on top of
/// [`HubConfig::validate`]
#[derive(Debug, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Validate a configuration with extended rules
    pub fn validate(&self, config: &HubConfig) -> Result<(), ValidationError> {
        config.validate()?;

        self.validate_routing_order(config)?;
        self.validate_timeouts(config)?;
        self.validate_enabled(config)?;

        Ok(())
    }

    /// Every order entry names a configured provider, at most once
    fn validate_routing_order(&self, config: &HubConfig) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for (i, name) in config.routing.order.iter().enumerate() {
            let path = format!("routing.order[{}]", i);

            if config.provider(name).is_none() {
                return Err(ValidationError::new(
                    path,
                    ValidationErrorKind::UnknownProvider { name: name.clone() },
                ));
            }

            if !seen.insert(name) {
                return Err(ValidationError::new(
                    path,
                    ValidationErrorKind::Duplicate {
                        value: name.clone(),
                    },
                ));
            }
        }

        Ok(())
    }

    fn validate_timeouts(&self, config: &HubConfig) -> Result<(), ValidationError> {
        let checks = [
            ("routing.default_timeout_ms", config.routing.default_timeout_ms),
            ("connection.connect_timeout_ms", config.connection.connect_timeout_ms),
            ("connection.request_timeout_ms", config.connection.request_timeout_ms),
        ];
        if let Some((path, _)) = checks.iter().find(|(_, ms)| *ms == 0) {
            return Err(ValidationError::not_positive(*path));
        }

        Ok(())
    }

    /// At least one provider ends up in the fallback order
    fn validate_enabled(&self, config: &HubConfig) -> Result<(), ValidationError> {
        if config.ordered_providers().is_empty() {
            return Err(ValidationError::new(
                "providers",
                ValidationErrorKind::NoProviders,
            ));
        }

        Ok(())
    }
}
