//! Environment variable interpolation and environment-only configuration

use super::error::ConfigError;
use super::schema::{HubConfig, MissingCredentialPolicy, ProviderConfig};
use super::secrets::SecretString;
use crate::providers::{ConfigurationError, ProviderType};
use regex::Regex;
use std::env;
use std::sync::LazyLock;
use tracing::debug;

static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is a valid regex")
});

/// Fallback order used when `AI_PROVIDER_ORDER` is not set
pub const DEFAULT_PROVIDER_ORDER: &str = "deepseek,gemini,openai";

/// Interpolate `${VAR}` references in a loaded configuration.
///
/// An unset variable in `api_key` leaves the credential absent, so the
/// missing-credential policy decides what happens to that provider. An unset
/// variable in `base_url` is an error.
pub fn interpolate_config_env_vars(config: &mut HubConfig) -> Result<(), ConfigError> {
    interpolate_with(config, |name| env::var(name).ok())
}

fn interpolate_with<F>(config: &mut HubConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    for (i, provider) in config.providers.iter_mut().enumerate() {
        if let Some(api_key) = &provider.api_key {
            if ENV_VAR_PATTERN.is_match(api_key.expose_secret()) {
                let field = format!("providers[{}].api_key", i);
                provider.api_key = match interpolate_value(api_key.expose_secret(), &field, &lookup)
                {
                    Ok(value) => Some(SecretString::new(value)),
                    Err(ConfigError::MissingVariable { var, .. }) => {
                        debug!("Credential variable {} for '{}' is not set", var, provider.name);
                        None
                    }
                    Err(e) => return Err(e),
                };
            }
        }

        if let Some(base_url) = &provider.base_url {
            if ENV_VAR_PATTERN.is_match(base_url) {
                let field = format!("providers[{}].base_url", i);
                provider.base_url = Some(interpolate_value(base_url, &field, &lookup)?);
            }
        }
    }

    Ok(())
}

/// Replace every `${VAR}` in a single value
fn interpolate_value<F>(value: &str, field: &str, lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = value.to_string();
    for cap in ENV_VAR_PATTERN.captures_iter(value) {
        let var_name = &cap[1];
        match lookup(var_name) {
            Some(env_value) => result = result.replace(&cap[0], &env_value),
            None => {
                return Err(ConfigError::MissingVariable {
                    var: var_name.to_string(),
                    field: field.to_string(),
                })
            }
        }
    }
    Ok(result)
}

/// Build a configuration purely from the process environment
pub fn config_from_env() -> Result<HubConfig, ConfigError> {
    config_from_lookup(|name| env::var(name).ok())
}

/// Build a configuration from an arbitrary variable lookup.
///
/// Recognised variables:
/// - `DEEPSEEK_API_KEY`, `GEMINI_API_KEY`, `OPENAI_API_KEY`, `GROQ_API_KEY`
/// - `AI_PROVIDER_ORDER`: comma-separated provider types
/// - `AI_MISSING_CREDENTIAL_POLICY`: `exclude` or `abort`
/// - `AI_PROVIDER_TIMEOUT_MS`: per-attempt timeout
/// - `AI_MOCK_PROVIDER`: `true` appends the offline mock provider
/// - `HOST`, `PORT`: server bind address
pub fn config_from_lookup<F>(lookup: F) -> Result<HubConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = HubConfig::new();

    let order = lookup("AI_PROVIDER_ORDER")
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PROVIDER_ORDER.to_string());

    let mut types = Vec::new();
    for entry in order.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let provider_type: ProviderType =
            entry.parse().map_err(|e: ConfigurationError| ConfigError::Environment {
                var: "AI_PROVIDER_ORDER",
                message: e.to_string(),
            })?;
        if types.contains(&provider_type) {
            return Err(ConfigError::Environment {
                var: "AI_PROVIDER_ORDER",
                message: format!("'{}' is listed more than once", entry),
            });
        }
        types.push(provider_type);
    }

    if is_truthy(lookup("AI_MOCK_PROVIDER").as_deref()) && !types.contains(&ProviderType::Mock) {
        types.push(ProviderType::Mock);
    }

    for provider_type in types {
        let mut provider = ProviderConfig::new(provider_type);
        provider.api_key = provider_type
            .credential_env_var()
            .and_then(&lookup)
            .map(SecretString::new);
        config.routing.order.push(provider.name.clone());
        config.providers.push(provider);
    }

    if let Some(policy) = lookup("AI_MISSING_CREDENTIAL_POLICY") {
        config.routing.missing_credential = policy
            .parse::<MissingCredentialPolicy>()
            .map_err(|message| ConfigError::Environment {
                var: "AI_MISSING_CREDENTIAL_POLICY",
                message,
            })?;
    }

    if let Some(timeout) = lookup("AI_PROVIDER_TIMEOUT_MS") {
        config.routing.default_timeout_ms =
            timeout
                .trim()
                .parse()
                .map_err(|_| ConfigError::Environment {
                    var: "AI_PROVIDER_TIMEOUT_MS",
                    message: format!("expected milliseconds, got '{}'", timeout),
                })?;
    }

    if let Some(host) = lookup("HOST") {
        config.server.host = host;
    }

    if let Some(port) = lookup("PORT") {
        config.server.port = port.trim().parse().map_err(|_| ConfigError::Environment {
            var: "PORT",
            message: format!("expected a port number, got '{}'", port),
        })?;
    }

    Ok(config)
}

fn is_truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_order_from_env() {
        let config = config_from_lookup(lookup_from(&[("GEMINI_API_KEY", "g-key")])).unwrap();

        assert_eq!(config.routing.order, vec!["DeepSeek", "Gemini", "OpenAI"]);
        assert!(config.provider("DeepSeek").unwrap().credential().is_none());
        assert_eq!(
            config.provider("Gemini").unwrap().credential().unwrap().expose_secret(),
            "g-key"
        );
        assert_eq!(config.routing.missing_credential, MissingCredentialPolicy::Exclude);
    }

    #[test]
    fn test_custom_order_policy_and_mock() {
        let config = config_from_lookup(lookup_from(&[
            ("AI_PROVIDER_ORDER", "gemini, groq"),
            ("AI_MISSING_CREDENTIAL_POLICY", "abort"),
            ("AI_PROVIDER_TIMEOUT_MS", "2500"),
            ("AI_MOCK_PROVIDER", "true"),
            ("PORT", "8080"),
        ]))
        .unwrap();

        assert_eq!(config.routing.order, vec!["Gemini", "Groq", "Mock (Test Mode)"]);
        assert_eq!(config.routing.missing_credential, MissingCredentialPolicy::Abort);
        assert_eq!(config.routing.default_timeout_ms, 2500);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_unknown_provider_in_order() {
        let err = config_from_lookup(lookup_from(&[("AI_PROVIDER_ORDER", "deepseek,claude")]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "AI_PROVIDER_ORDER: unknown provider type 'claude'"
        );
    }

    #[test]
    fn test_repeated_provider_in_order() {
        let err = config_from_lookup(lookup_from(&[("AI_PROVIDER_ORDER", "openai,openai")]))
            .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_missing_api_key_var_leaves_credential_absent() {
        let mut config = HubConfig::new();
        config.providers.push(
            ProviderConfig::new(ProviderType::OpenAI).with_api_key("${AIHUB_TEST_UNSET_KEY}"),
        );

        interpolate_with(&mut config, lookup_from(&[])).unwrap();
        assert!(config.providers[0].api_key.is_none());
    }

    #[test]
    fn test_api_key_and_base_url_interpolation() {
        let mut config = HubConfig::new();
        config.providers.push(
            ProviderConfig::new(ProviderType::OpenAI)
                .with_api_key("${KEY}")
                .with_base_url("${PROXY}/v1"),
        );

        interpolate_with(
            &mut config,
            lookup_from(&[("KEY", "sk-abc"), ("PROXY", "http://localhost:9000")]),
        )
        .unwrap();

        let provider = &config.providers[0];
        assert_eq!(provider.api_key.as_ref().unwrap().expose_secret(), "sk-abc");
        assert_eq!(provider.base_url.as_deref(), Some("http://localhost:9000/v1"));
    }

    #[test]
    fn test_missing_base_url_var_is_an_error() {
        let mut config = HubConfig::new();
        config
            .providers
            .push(ProviderConfig::new(ProviderType::Groq).with_base_url("${MISSING_PROXY}"));

        let err = interpolate_with(&mut config, lookup_from(&[])).unwrap_err();
        match err {
            ConfigError::MissingVariable { var, field } => {
                assert_eq!(var, "MISSING_PROXY");
                assert_eq!(field, "providers[0].base_url");
            }
            other => panic!("Expected MissingVariable, got {other:?}"),
        }
    }
}
