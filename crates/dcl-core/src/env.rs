//! Environment provider trait for testable environment access.
//!
//! Edition 2024 makes `std::env::set_var` unsafe, and the workspace denies
//! unsafe code, so every read of the process environment goes through this
//! trait. Tests inject [`MockEnv`].

use std::ffi::OsString;

/// Trait for accessing environment variables (injectable for testing).
pub trait EnvProvider: Send + Sync {
    /// Get an environment variable.
    fn get(&self, key: &str) -> Option<OsString>;

    /// Get an environment variable as UTF-8, treating non-UTF-8 values as absent.
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|value| value.into_string().ok())
    }

    /// Whether a variable is present and non-empty.
    fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| !value.is_empty())
    }
}

/// Production environment provider that reads from the actual process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl EnvProvider for SystemEnv {
    fn get(&self, key: &str) -> Option<OsString> {
        std::env::var_os(key)
    }
}

/// Test/mock environment provider with predefined variables.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Clone, Default)]
pub struct MockEnv {
    vars: std::collections::HashMap<String, OsString>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockEnv {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl EnvProvider for MockEnv {
    fn get(&self, key: &str) -> Option<OsString> {
        self.vars.get(key).cloned()
    }
}
