//! Override file loading.
//!
//! The override file has the shape
//! `{"servers": {name: {command, args, env, description}}}`.
//! Entries keep their file order.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::CONFIG_PATH_VAR;
use crate::domain::ServerDescriptor;
use crate::env::EnvProvider;
use crate::error::ConfigError;

/// File name searched for in the working directory and the user config dir.
pub const CONFIG_FILE_NAME: &str = "mcp_config.json";

#[derive(Debug, Deserialize)]
struct OverrideFile {
    #[serde(default)]
    servers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ServerEntry {
    command: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: IndexMap<String, String>,
    #[serde(default)]
    description: String,
}

/// Load raw (not yet interpolated) descriptors from an override file.
///
/// Any unreadable file, malformed JSON, or invalid entry fails the whole file.
pub fn load_overrides(path: &Path) -> Result<Vec<ServerDescriptor>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_overrides(&content, path)
}

fn parse_overrides(content: &str, path: &Path) -> Result<Vec<ServerDescriptor>, ConfigError> {
    let file: OverrideFile = serde_json::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    file.servers
        .into_iter()
        .map(|(name, value)| {
            let entry: ServerEntry =
                serde_json::from_value(value).map_err(|source| ConfigError::InvalidEntry {
                    path: path.to_path_buf(),
                    name: name.clone(),
                    source,
                })?;
            Ok(ServerDescriptor {
                name,
                command: entry.command,
                args: entry.args,
                env: entry.env,
                description: entry.description,
            })
        })
        .collect()
}

/// Locate the override file.
///
/// Search order: explicit path, `DCL_CONFIG`, `./mcp_config.json`, then
/// `<config dir>/dcl/mcp_config.json`. Explicit and env paths are returned
/// even if they do not exist so the caller can report them.
pub fn resolve_config_path(explicit: Option<&Path>, env: &dyn EnvProvider) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(path) = env.var(CONFIG_PATH_VAR).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("dcl").join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}
