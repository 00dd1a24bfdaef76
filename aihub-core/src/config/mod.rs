//! Configuration module for AI Solutions Hub
//!
//! This module provides the configuration schema, loading and validation for
//! the provider chain and the HTTP server. Configuration comes either from a
//! YAML/JSON file (with `${VAR}` interpolation) or straight from the process
//! environment.

mod env;
mod error;
mod schema;
mod secrets;
mod validator;

pub use env::{config_from_env, config_from_lookup, DEFAULT_PROVIDER_ORDER};
pub use error::{ConfigError, ConfigResult, Location, ValidationError, ValidationErrorKind};
pub use schema::{
    ConnectionConfig, HubConfig, MissingCredentialPolicy, ProviderConfig, RoutingConfig,
    ServerConfig, CONFIG_VERSION,
};
pub use secrets::SecretString;
pub use validator::ConfigValidator;

use std::fs;
use std::path::Path;

/// Load a configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> ConfigResult<HubConfig> {
    let path = path.as_ref();
    let content = read_config(path)?;

    let config: HubConfig =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            format: "YAML",
            location: e.location().map(|l| Location {
                line: l.line(),
                column: l.column(),
            }),
            message: e.to_string(),
        })?;

    finish(config)
}

/// Load a configuration from a JSON file
pub fn load_from_json<P: AsRef<Path>>(path: P) -> ConfigResult<HubConfig> {
    let path = path.as_ref();
    let content = read_config(path)?;

    let config: HubConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            format: "JSON",
            location: Some(Location {
                line: e.line(),
                column: e.column(),
            }),
            message: e.to_string(),
        })?;

    finish(config)
}

/// Load a configuration file, picking the format from its extension
pub fn load_from_path<P: AsRef<Path>>(path: P) -> ConfigResult<HubConfig> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_from_json(path),
        _ => load_from_yaml(path),
    }
}

impl HubConfig {
    /// Build and validate a configuration from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        let config = config_from_env()?;
        ConfigValidator::new().validate(&config)?;
        Ok(config)
    }
}

fn read_config(path: &Path) -> ConfigResult<String> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn finish(mut config: HubConfig) -> ConfigResult<HubConfig> {
    env::interpolate_config_env_vars(&mut config)?;
    ConfigValidator::new().validate(&config)?;
    Ok(config)
}
