//! Required credentials per server and missing-credential detection.

use std::collections::BTreeMap;

use crate::env::EnvProvider;

/// Environment variables that must be non-empty for each server to be usable.
///
/// Built once at startup, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredCredentials {
    entries: BTreeMap<String, Vec<String>>,
}

impl RequiredCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the required variables for a server, replacing any previous list.
    ///
    /// Duplicate variable names are dropped, keeping the first occurrence.
    pub fn insert<I, S>(&mut self, server: impl Into<String>, vars: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for var in vars {
            let var = var.into();
            if !unique.contains(&var) {
                unique.push(var);
            }
        }
        self.entries.insert(server.into(), unique);
    }

    /// Required variables for a server (empty if none or unknown).
    pub fn get(&self, server: &str) -> &[String] {
        self.entries.get(server).map_or(&[], Vec::as_slice)
    }

    /// Required variables for `server` that are unset or empty in `env`.
    pub fn missing(&self, server: &str, env: &dyn EnvProvider) -> Vec<String> {
        self.get(server)
            .iter()
            .filter(|var| !env.is_set(var))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(server, vars)| (server.as_str(), vars.as_slice()))
    }
}
