//! Spawning subordinate server processes.
//!
//! [`ProcessLauncher`] is the seam between the session layer and the OS.
//! [`CommandLauncher`] resolves the descriptor's command to an executable,
//! then spawns it with piped stdio and `kill_on_drop`. On unix the child
//! leads a new process group so teardown can signal everything it starts.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use dcl_core::{EnvProvider, ServerDescriptor};
use thiserror::Error;
use tokio::process::{Child, Command};

use crate::resolver::{ResolveError, resolve_command};

/// Failure to start a subordinate process.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Spawned process has no {0} pipe")]
    MissingPipe(&'static str),
}

/// Starts a subordinate process for a launch descriptor.
pub trait ProcessLauncher: Send + Sync {
    /// Spawn the process with stdin, stdout and stderr piped.
    fn launch(&self, descriptor: &ServerDescriptor) -> Result<Child, LaunchError>;
}

/// Launcher that resolves commands on the local machine.
pub struct CommandLauncher {
    env: Arc<dyn EnvProvider>,
}

impl CommandLauncher {
    pub fn new(env: Arc<dyn EnvProvider>) -> Self {
        Self { env }
    }
}

impl ProcessLauncher for CommandLauncher {
    fn launch(&self, descriptor: &ServerDescriptor) -> Result<Child, LaunchError> {
        let resolution = resolve_command(&descriptor.command, self.env.as_ref())?;
        for warning in &resolution.warnings {
            tracing::warn!(server_name = %descriptor.name, "{warning}");
        }

        let exe = resolution.path;
        let effective_path = effective_path(&exe, self.env.get("PATH"));

        let mut command = Command::new(&exe);
        command
            .args(&descriptor.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .env("PATH", &effective_path)
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        // Descriptor overrides win over the inherited environment, PATH included
        command.envs(&descriptor.env);

        tracing::debug!(
            server_name = %descriptor.name,
            exe = %exe.display(),
            args = ?descriptor.args,
            "Spawning subordinate server"
        );

        command.spawn().map_err(|source| LaunchError::Spawn {
            command: exe.display().to_string(),
            source,
        })
    }
}

/// `PATH` for the child: the executable's own directory first, so `npx`
/// finds the `node` it was installed with, then the inherited entries.
fn effective_path(exe: &Path, inherited: Option<OsString>) -> OsString {
    let mut entries = Vec::new();
    if let Some(dir) = exe.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        entries.push(dir.to_path_buf());
    }
    if let Some(inherited) = inherited {
        entries.extend(std::env::split_paths(&inherited).filter(|p| !p.as_os_str().is_empty()));
    }

    let mut seen = std::collections::HashSet::new();
    entries.retain(|entry| seen.insert(entry.clone()));

    std::env::join_paths(&entries).unwrap_or_else(|_| OsString::from(String::new()))
}
