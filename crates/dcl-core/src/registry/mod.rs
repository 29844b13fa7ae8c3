//! The server registry.
//!
//! Built once at startup by merging the built-in servers with an optional
//! override file, then handed to the gateway as an immutable value.

mod defaults;
mod loader;

use std::path::Path;

use crate::credentials::RequiredCredentials;
use crate::domain::ServerDescriptor;
use crate::env::EnvProvider;

pub use defaults::{builtin_required_credentials, builtin_servers};
pub use loader::{CONFIG_FILE_NAME, load_overrides, resolve_config_path};

/// Immutable mapping from server name to launch descriptor and required credentials.
///
/// Iteration follows catalog order: insertion order, with replacements
/// keeping the position of the entry they replace.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    servers: Vec<ServerDescriptor>,
    required: RequiredCredentials,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding only the built-in servers, with ambient env filled in.
    pub fn builtin(env: &dyn EnvProvider) -> Self {
        let mut registry = Self {
            servers: Vec::new(),
            required: builtin_required_credentials(),
        };
        for server in builtin_servers() {
            registry.upsert(server.interpolate_env(env));
        }
        registry
    }

    /// Add a server, replacing any server with the same name.
    #[must_use]
    pub fn with_server(mut self, server: ServerDescriptor) -> Self {
        self.upsert(server);
        self
    }

    /// Set the required credentials for a server.
    #[must_use]
    pub fn with_required<I, S>(mut self, server: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.insert(server, vars);
        self
    }

    /// Merge override descriptors (raw, before interpolation).
    ///
    /// Each override replaces a same-named server. Env entries with empty
    /// values become that server's required credentials and are filled from
    /// the ambient environment.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Vec<ServerDescriptor>, env: &dyn EnvProvider) -> Self {
        for server in overrides {
            let required = server.ambient_env_keys();
            if !required.is_empty() {
                self.required.insert(server.name.clone(), required);
            }
            self.upsert(server.interpolate_env(env));
        }
        self
    }

    fn upsert(&mut self, server: ServerDescriptor) {
        match self.servers.iter_mut().find(|s| s.name == server.name) {
            Some(existing) => *existing = server,
            None => self.servers.push(server),
        }
    }

    /// Look up a server by name.
    pub fn get(&self, name: &str) -> Option<&ServerDescriptor> {
        self.servers.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Servers in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &ServerDescriptor> {
        self.servers.iter()
    }

    /// Server names in catalog order.
    pub fn names(&self) -> Vec<String> {
        self.servers.iter().map(|s| s.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub const fn required_credentials(&self) -> &RequiredCredentials {
        &self.required
    }

    /// Required variables for `name` that are currently unset or empty.
    ///
    /// Empty for unknown servers and servers without requirements.
    pub fn missing_credentials(&self, name: &str, env: &dyn EnvProvider) -> Vec<String> {
        if !self.contains(name) {
            return Vec::new();
        }
        self.required.missing(name, env)
    }

    /// Every server with at least one missing credential, in catalog order.
    pub fn missing_credentials_report(&self, env: &dyn EnvProvider) -> Vec<(String, Vec<String>)> {
        self.servers
            .iter()
            .filter_map(|server| {
                let missing = self.required.missing(&server.name, env);
                (!missing.is_empty()).then(|| (server.name.clone(), missing))
            })
            .collect()
    }

    /// Log one advisory warning listing servers with missing credentials.
    pub fn warn_missing_credentials(&self, env: &dyn EnvProvider) {
        let report = self.missing_credentials_report(env);
        if report.is_empty() {
            return;
        }

        let summary = report
            .iter()
            .map(|(server, vars)| format!("{server}: {}", vars.join(", ")))
            .collect::<Vec<_>>()
            .join("; ");
        tracing::warn!(
            affected = report.len(),
            missing = %summary,
            "Missing environment variables for some MCP servers; they will not work until these are set"
        );
    }
}

/// Build the registry from the built-ins and an optional override file.
///
/// Never fails: an unreadable or malformed override file logs a warning and
/// the built-ins are used alone.
pub fn build_registry(override_path: Option<&Path>, env: &dyn EnvProvider) -> Registry {
    let registry = Registry::builtin(env);

    let Some(path) = override_path else {
        tracing::info!(
            "No {CONFIG_FILE_NAME} found; using only default MCP servers"
        );
        return registry;
    };

    match load_overrides(path) {
        Ok(overrides) => {
            if !overrides.is_empty() {
                tracing::info!(
                    path = %path.display(),
                    count = overrides.len(),
                    "Loaded custom MCP servers"
                );
            }
            registry.with_overrides(overrides, env)
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Could not load MCP server overrides; using only default MCP servers"
            );
            registry
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnv;

    #[test]
    fn test_builtin_order_and_interpolation() {
        let env = MockEnv::new().with_var("APIFY_TOKEN", "apify");
        let registry = Registry::builtin(&env);

        assert_eq!(
            registry.names(),
            vec![
                "context7",
                "google-analytics",
                "actors-mcp-server",
                "github",
                "dataforseo"
            ]
        );
        assert_eq!(
            registry.get("actors-mcp-server").unwrap().env["APIFY_TOKEN"],
            "apify"
        );
    }

    #[test]
    fn test_override_replaces_in_place_and_appends_new() {
        let env = MockEnv::new();
        let registry = Registry::builtin(&env).with_overrides(
            vec![
                ServerDescriptor::new("github", "gh-mcp", "custom github"),
                ServerDescriptor::new("local", "local-mcp", "local tools"),
            ],
            &env,
        );

        let names = registry.names();
        assert_eq!(names[3], "github");
        assert_eq!(names.last().map(String::as_str), Some("local"));
        assert_eq!(registry.get("github").unwrap().command, "gh-mcp");
        // Hard-coded requirement survives an override without empty env values
        assert_eq!(
            registry.required_credentials().get("github"),
            ["GITHUB_PERSONAL_ACCESS_TOKEN"]
        );
    }

    #[test]
    fn test_override_empty_env_becomes_required() {
        let env = MockEnv::new().with_var("LOCAL_KEY", "k");
        let registry = Registry::new().with_overrides(
            vec![
                ServerDescriptor::new("local", "local-mcp", "local tools")
                    .with_env("LOCAL_KEY", "")
                    .with_env("LOCAL_SECRET", ""),
            ],
            &env,
        );

        assert_eq!(
            registry.missing_credentials("local", &env),
            vec!["LOCAL_SECRET"]
        );
        assert_eq!(registry.get("local").unwrap().env["LOCAL_KEY"], "k");
    }

    #[test]
    fn test_missing_credentials_unknown_server_is_empty() {
        let registry = Registry::new().with_required("ghost", ["TOKEN"]);
        assert!(registry.missing_credentials("ghost", &MockEnv::new()).is_empty());
    }

    #[test]
    fn test_missing_credentials_report() {
        let env = MockEnv::new()
            .with_var("GITHUB_PERSONAL_ACCESS_TOKEN", "ghp")
            .with_var("DATAFORSEO_USERNAME", "me");
        let report = Registry::builtin(&env).missing_credentials_report(&env);

        assert_eq!(
            report,
            vec![
                ("actors-mcp-server".to_string(), vec!["APIFY_TOKEN".to_string()]),
                (
                    "dataforseo".to_string(),
                    vec!["DATAFORSEO_PASSWORD".to_string()]
                ),
            ]
        );
    }

    #[test]
    fn test_build_registry_without_file_uses_builtins() {
        let registry = build_registry(None, &MockEnv::new());
        assert_eq!(registry.len(), builtin_servers().len());
    }

    #[test]
    fn test_build_registry_with_unreadable_file_uses_builtins() {
        let registry = build_registry(
            Some(Path::new("/nonexistent/dcl/mcp_config.json")),
            &MockEnv::new(),
        );
        assert_eq!(registry.len(), builtin_servers().len());
    }
}
