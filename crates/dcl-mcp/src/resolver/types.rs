//! Types for command resolution.

use std::fmt;
use std::path::PathBuf;

/// A command resolved to an executable, with the trail that led there.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Absolute (or caller-given) path of the executable to spawn.
    pub path: PathBuf,
    /// Every candidate checked, in order.
    pub probes: Vec<Probe>,
    /// Non-fatal notes, e.g. an absolute path that fell back to its basename.
    pub warnings: Vec<String>,
}

/// One candidate path and what was found there.
#[derive(Debug, Clone)]
pub struct Probe {
    pub candidate: PathBuf,
    pub outcome: ProbeOutcome,
}

impl Probe {
    pub const fn is_hit(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Executable)
    }
}

/// Result of checking a single candidate path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Executable,
    NotFound,
    NotAFile,
    NotExecutable,
    PermissionDenied,
    IoError(String),
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Executable => write!(f, "executable"),
            Self::NotFound => write!(f, "not found"),
            Self::NotAFile => write!(f, "not a file"),
            Self::NotExecutable => write!(f, "not executable"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::IoError(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

/// Resolution failed outright.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Launch command is empty")]
    EmptyCommand,

    #[error("Could not find executable '{command}'. Tried:\n{tried}")]
    NotFound { command: String, tried: String },
}

impl ResolveError {
    /// Build a `NotFound` error listing every probe.
    pub fn not_found(command: impl Into<String>, probes: &[Probe]) -> Self {
        let tried = if probes.is_empty() {
            "  (no candidates checked)".to_string()
        } else {
            probes
                .iter()
                .map(|p| format!("  ✗ {}: {}", p.candidate.display(), p.outcome))
                .collect::<Vec<_>>()
                .join("\n")
        };

        Self::NotFound {
            command: command.into(),
            tried,
        }
    }
}
