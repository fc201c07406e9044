//! Process-environment configuration provider
//!
//! Production resolution reads the deployment's environment variables; tests
//! inject a static provider instead.

#![allow(dead_code)]

use std::env;

use super::ConfigProvider;

/// Provider backed by the process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvProvider;

impl ConfigProvider for EnvProvider {
    fn get(&self, name: &str) -> Option<String> {
        env::var(name).ok().filter(|v| !v.is_empty())
    }
}

/// Print the configuration surface consumed by the harness.
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!(
        "  {}   Base URL of the status API service",
        super::BACKEND_URL_VAR
    );
    println!("  {}   Base URL of the record store", super::STORE_URL_VAR);
    println!(
        "  {}   Anonymous (public) record store key",
        super::STORE_KEY_VAR
    );
    println!();
    println!("Example:");
    println!("  export {}=https://app.example.com", super::BACKEND_URL_VAR);
    println!(
        "  export {}=https://project.supabase.co",
        super::STORE_URL_VAR
    );
    println!("  export {}=<anon-key>", super::STORE_KEY_VAR);
    println!("  waitlist-probe run");
}

/// Guard that sets variables for a scope and restores them on drop.
/// Test helper only.
pub struct ScopedVars {
    previous: Vec<(String, Option<String>)>,
}

impl ScopedVars {
    pub fn set(vars: &[(&str, &str)]) -> Self {
        let previous = vars
            .iter()
            .map(|(k, _)| ((*k).to_string(), env::var(k).ok()))
            .collect();

        for (key, value) in vars {
            env::set_var(key, value);
        }

        Self { previous }
    }
}

impl Drop for ScopedVars {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectionConfig, BACKEND_URL_VAR, STORE_KEY_VAR, STORE_URL_VAR};

    #[test]
    fn test_env_provider_resolves_scoped_vars() {
        let _guard = ScopedVars::set(&[
            (BACKEND_URL_VAR, "https://app.test"),
            (STORE_URL_VAR, "https://store.test"),
            (STORE_KEY_VAR, "anon-key-0123456789"),
        ]);

        let config = ConnectionConfig::resolve(&EnvProvider).unwrap();
        assert_eq!(config.base_api_url, "https://app.test");
        assert_eq!(config.store_url, "https://store.test");
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let provider = EnvProvider;
        let _guard = ScopedVars::set(&[("WAITLIST_PROBE_TEST_EMPTY", "")]);
        assert_eq!(provider.get("WAITLIST_PROBE_TEST_EMPTY"), None);
    }
}
