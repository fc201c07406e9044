//! Configuration module
//!
//! Assembles the immutable `ConnectionConfig` from an injected provider.
//! Resolution is fail-fast: the first missing value aborts the run before any
//! network call is attempted.

#![allow(dead_code)]

pub mod env;

use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

pub use env::EnvProvider;

/// Variable naming the status API base URL.
pub const BACKEND_URL_VAR: &str = "REACT_APP_BACKEND_URL";

/// Variable naming the record store base URL.
pub const STORE_URL_VAR: &str = "REACT_APP_SUPABASE_URL";

/// Variable naming the anonymous record store key.
pub const STORE_KEY_VAR: &str = "REACT_APP_SUPABASE_ANON_KEY";

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required variable {0}")]
    MissingVariable(&'static str),
}

/// Source of configuration values.
///
/// Injected so the harness can be exercised against static providers in
/// tests instead of ambient process state.
pub trait ConfigProvider {
    fn get(&self, name: &str) -> Option<String>;
}

/// Static provider for tests and staged runs.
#[derive(Clone, Debug, Default)]
pub struct StaticProvider {
    values: HashMap<String, String>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl ConfigProvider for StaticProvider {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// Connection parameters for one harness run. Immutable after resolution.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Base URL of the status API service (without the `/api` suffix).
    pub base_api_url: String,

    /// Base URL of the record store.
    pub store_url: String,

    /// Anonymous (public) record store key.
    pub store_key: String,
}

impl ConnectionConfig {
    /// Resolve from a provider, naming the first missing variable.
    pub fn resolve(provider: &dyn ConfigProvider) -> Result<Self, ConfigError> {
        let base_api_url = provider
            .get(BACKEND_URL_VAR)
            .ok_or(ConfigError::MissingVariable(BACKEND_URL_VAR))?;
        let store_url = provider
            .get(STORE_URL_VAR)
            .ok_or(ConfigError::MissingVariable(STORE_URL_VAR))?;
        let store_key = provider
            .get(STORE_KEY_VAR)
            .ok_or(ConfigError::MissingVariable(STORE_KEY_VAR))?;

        if !store_url.starts_with("https://") {
            warn!("record store URL does not use https: {}", store_url);
        }

        Ok(Self {
            base_api_url,
            store_url,
            store_key,
        })
    }

    /// Full URL of the status API sub-path.
    pub fn api_url(&self) -> String {
        format!("{}/api", self.base_api_url.trim_end_matches('/'))
    }

    /// Full URL of the record store's REST surface.
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.store_url.trim_end_matches('/'))
    }

    /// Truncated key for logs and summaries. The full key never leaves the
    /// request headers.
    pub fn key_preview(&self) -> String {
        let preview: String = self.store_key.chars().take(10).collect();
        format!("{preview}...")
    }

    /// Print the resolved configuration.
    pub fn print_summary(&self) {
        println!("Connection Configuration:");
        println!("  {BACKEND_URL_VAR}:      {}", self.base_api_url);
        println!("  {STORE_URL_VAR}:     {}", self.store_url);
        println!("  {STORE_KEY_VAR}: {}", self.key_preview());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_provider() -> StaticProvider {
        StaticProvider::new()
            .with(BACKEND_URL_VAR, "https://app.test")
            .with(STORE_URL_VAR, "https://store.test/")
            .with(STORE_KEY_VAR, "anon-key-0123456789abcdef")
    }

    #[test]
    fn test_resolve_complete() {
        let config = ConnectionConfig::resolve(&full_provider()).unwrap();
        assert_eq!(config.api_url(), "https://app.test/api");
        assert_eq!(config.rest_url(), "https://store.test/rest/v1");
    }

    #[test]
    fn test_first_missing_variable_named() {
        let provider = StaticProvider::new().with(STORE_URL_VAR, "https://store.test");
        let err = ConnectionConfig::resolve(&provider).unwrap_err();
        assert_eq!(err, ConfigError::MissingVariable(BACKEND_URL_VAR));
    }

    #[test]
    fn test_missing_key_named() {
        let provider = StaticProvider::new()
            .with(BACKEND_URL_VAR, "https://app.test")
            .with(STORE_URL_VAR, "https://store.test");
        let err = ConnectionConfig::resolve(&provider).unwrap_err();
        assert_eq!(err, ConfigError::MissingVariable(STORE_KEY_VAR));
    }

    #[test]
    fn test_key_preview_truncates() {
        let config = ConnectionConfig::resolve(&full_provider()).unwrap();
        assert_eq!(config.key_preview(), "anon-key-0...");
    }
}
