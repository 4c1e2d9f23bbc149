//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! The upstream API credential is referenced by env-var name in the config
//! and resolved once at startup — handlers never read the environment.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;

use crate::error::BoxsightError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listen port. Overridable at runtime by the `PORT` env var.
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { port: 5000 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    /// Completions endpoint URL.
    pub api_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Name of the env var holding the API credential.
    pub api_key_env: String,
    /// Outbound request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.x.ai/v1/completions".to_string(),
            model: "grok-3".to_string(),
            api_key_env: "XAI_API_KEY".to_string(),
            request_timeout_secs: 120,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Effective listen port: the `PORT` env var when set and valid,
    /// otherwise the configured port.
    pub fn effective_port(&self) -> u16 {
        std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(self.service.port)
    }
}

impl LlmConfig {
    /// Resolve the API credential from the configured env var.
    ///
    /// Fails fast with a configuration error when the variable is unset or
    /// blank, so the process never starts serving without a credential.
    pub fn resolve_api_key(&self) -> std::result::Result<SecretString, BoxsightError> {
        match std::env::var(&self.api_key_env) {
            Ok(value) if !value.trim().is_empty() => Ok(SecretString::new(value)),
            _ => Err(BoxsightError::Config(format!(
                "environment variable {} is not set",
                self.api_key_env
            ))),
        }
    }
}
