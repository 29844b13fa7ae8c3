//! Command resolution driver.

use std::path::{MAIN_SEPARATOR, Path};

use dcl_core::EnvProvider;

use super::fs::{FsProvider, SystemFs};
use super::search::{Origin, SearchDirs};
use super::types::{Probe, ResolveError, Resolution};

/// Colon-separated (`;` on Windows) extra directories searched last.
pub const EXTRA_PATH_VAR: &str = "DCL_EXTRA_PATH";

/// Resolve a launch command against the real filesystem.
pub fn resolve_command(command: &str, env: &dyn EnvProvider) -> Result<Resolution, ResolveError> {
    resolve_command_with(command, env, &SystemFs)
}

/// Resolve with an injected filesystem.
pub fn resolve_command_with(
    command: &str,
    env: &dyn EnvProvider,
    fs: &dyn FsProvider,
) -> Result<Resolution, ResolveError> {
    let command = command.trim();
    if command.is_empty() {
        return Err(ResolveError::EmptyCommand);
    }

    let mut probes = Vec::new();
    let mut warnings = Vec::new();

    let as_path = Path::new(command);
    let has_separator = command.contains('/') || command.contains(MAIN_SEPARATOR);
    if as_path.is_absolute() || has_separator {
        let probe = Probe {
            candidate: as_path.to_path_buf(),
            outcome: fs.check_executable(as_path),
        };
        let hit = probe.is_hit();
        let outcome = probe.outcome.clone();
        probes.push(probe);

        if hit {
            return Ok(Resolution {
                path: as_path.to_path_buf(),
                probes,
                warnings,
            });
        }

        // A stale absolute path (e.g. an upgraded node install) falls back to its basename
        let Some(basename) = as_path.file_name().and_then(|n| n.to_str()) else {
            return Err(ResolveError::not_found(command, &probes));
        };
        warnings.push(format!(
            "'{command}' is {outcome}, searching for '{basename}' instead"
        ));
        return search(basename, env, fs, probes, warnings);
    }

    search(command, env, fs, probes, warnings)
}

fn search(
    command: &str,
    env: &dyn EnvProvider,
    fs: &dyn FsProvider,
    mut probes: Vec<Probe>,
    warnings: Vec<String>,
) -> Result<Resolution, ResolveError> {
    let dirs = SearchDirs::new(env, fs);
    let names = dirs.file_names(command);

    let mut origins = vec![Origin::Path];
    if cfg!(target_os = "macos") {
        origins.push(Origin::EtcPaths);
    }
    origins.extend([Origin::PlatformDefault, Origin::NodeManager, Origin::Extra]);

    for origin in origins {
        for dir in dirs.dirs(origin, command, EXTRA_PATH_VAR) {
            for name in &names {
                let candidate = dir.join(name);
                let outcome = fs.check_executable(&candidate);
                let probe = Probe { candidate, outcome };
                if probe.is_hit() {
                    tracing::debug!(
                        command,
                        resolved = %probe.candidate.display(),
                        origin = ?origin,
                        "Resolved launch command"
                    );
                    let path = probe.candidate.clone();
                    probes.push(probe);
                    return Ok(Resolution {
                        path,
                        probes,
                        warnings,
                    });
                }
                probes.push(probe);
            }
        }
    }

    Err(ResolveError::not_found(command, &probes))
}
