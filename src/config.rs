//! Configuration System
//!
//! Layered configuration for the walk client: built-in defaults, an optional
//! TOML file, then `ACLWALK_*` environment overrides. Validation runs before
//! anything touches the network.

use crate::endpoint::EndpointConfig;
use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AclwalkConfig {
    /// Walk endpoint connection settings
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Defaults applied to simple (run-to-completion) operations
    #[serde(default)]
    pub run: RunConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults for simple runs. The configurable operation forms ignore these;
/// their `RunRequest` is authoritative.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Batch-size hint. `None` lets the service choose.
    #[serde(default)]
    pub batch_size: Option<u32>,
}

impl AclwalkConfig {
    /// Load configuration from `path` (or `./aclwalk.toml` when omitted),
    /// with `ACLWALK_*` environment variables taking precedence. Nested keys
    /// use `__`, e.g. `ACLWALK_ENDPOINT__BASE_URL`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name("aclwalk").required(false)),
        };
        builder = builder.add_source(Environment::with_prefix("ACLWALK").separator("__"));

        builder
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "endpoint base URL must be set".to_string(),
            ));
        }
        reqwest::Url::parse(&self.endpoint.base_url)
            .map_err(|e| ConfigError::Invalid(format!("invalid endpoint base URL: {}", e)))?;

        if self.endpoint.connect_timeout_secs == 0 || self.endpoint.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "endpoint timeouts must be at least 1 second".to_string(),
            ));
        }
        if self.run.batch_size == Some(0) {
            return Err(ConfigError::Invalid(
                "run batch size must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
