//! Subordinate server launch descriptors.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::env::EnvProvider;

/// Launch descriptor for one subordinate MCP server.
///
/// Descriptors are immutable once the [`Registry`](crate::Registry) is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDescriptor {
    /// Unique server name (registry key).
    pub name: String,

    /// Executable to run (e.g., "npx"). Resolved to an absolute path at launch.
    pub command: String,

    /// Arguments passed to the executable, in order.
    #[serde(default)]
    pub args: Vec<String>,

    /// Environment overrides for the child process.
    ///
    /// An empty value means "take this variable from the ambient environment".
    /// Declaration order is kept; it is the order missing credentials are reported in.
    #[serde(default)]
    pub env: IndexMap<String, String>,

    /// Human-readable description shown in the catalog.
    #[serde(default)]
    pub description: String,
}

impl ServerDescriptor {
    /// Create a descriptor with no arguments or environment overrides.
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            env: IndexMap::new(),
            description: description.into(),
        }
    }

    /// Set the argument list.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Add an environment override.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Names of env entries whose configured value is empty, in declaration order.
    ///
    /// These must be supplied by the ambient environment.
    pub fn ambient_env_keys(&self) -> Vec<String> {
        self.env
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Replace every empty env value with the ambient value of that variable.
    ///
    /// Variables absent from the environment stay empty.
    #[must_use]
    pub fn interpolate_env(mut self, env: &dyn EnvProvider) -> Self {
        for (key, value) in &mut self.env {
            if value.is_empty() {
                *value = env.var(key).unwrap_or_default();
            }
        }
        self
    }
}
