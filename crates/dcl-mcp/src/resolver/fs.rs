//! Filesystem access used by the resolver (injectable for testing).

use std::path::Path;

use super::types::ProbeOutcome;

/// Filesystem operations the resolver needs.
pub trait FsProvider: Send + Sync {
    /// Classify a candidate path.
    fn check_executable(&self, path: &Path) -> ProbeOutcome;

    /// Read a small text file, `None` if unreadable.
    fn read_to_string(&self, path: &Path) -> Option<String>;

    /// Names of the entries in a directory, empty if unreadable.
    fn list_dir(&self, path: &Path) -> Vec<String>;
}

/// Real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFs;

impl FsProvider for SystemFs {
    fn check_executable(&self, path: &Path) -> ProbeOutcome {
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                return match e.kind() {
                    std::io::ErrorKind::NotFound => ProbeOutcome::NotFound,
                    std::io::ErrorKind::PermissionDenied => ProbeOutcome::PermissionDenied,
                    _ => ProbeOutcome::IoError(e.to_string()),
                };
            }
        };

        if !metadata.is_file() {
            return ProbeOutcome::NotAFile;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if metadata.permissions().mode() & 0o111 == 0 {
                return ProbeOutcome::NotExecutable;
            }
        }

        ProbeOutcome::Executable
    }

    fn read_to_string(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }

    fn list_dir(&self, path: &Path) -> Vec<String> {
        std::fs::read_dir(path)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter_map(|entry| entry.file_name().into_string().ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// In-memory filesystem for resolver tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFs {
    executables: std::collections::HashSet<std::path::PathBuf>,
    non_executables: std::collections::HashSet<std::path::PathBuf>,
    files: std::collections::HashMap<std::path::PathBuf, String>,
    dirs: std::collections::HashMap<std::path::PathBuf, Vec<String>>,
}

#[cfg(test)]
impl MockFs {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_executable(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.executables.insert(path.into());
        self
    }

    #[must_use]
    pub fn with_non_executable(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.non_executables.insert(path.into());
        self
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<std::path::PathBuf>, contents: &str) -> Self {
        self.files.insert(path.into(), contents.to_string());
        self
    }

    #[must_use]
    pub fn with_dir(mut self, path: impl Into<std::path::PathBuf>, entries: &[&str]) -> Self {
        self.dirs.insert(
            path.into(),
            entries.iter().map(ToString::to_string).collect(),
        );
        self
    }
}

#[cfg(test)]
impl FsProvider for MockFs {
    fn check_executable(&self, path: &Path) -> ProbeOutcome {
        if self.executables.contains(path) {
            ProbeOutcome::Executable
        } else if self.non_executables.contains(path) {
            ProbeOutcome::NotExecutable
        } else {
            ProbeOutcome::NotFound
        }
    }

    fn read_to_string(&self, path: &Path) -> Option<String> {
        self.files.get(path).cloned()
    }

    fn list_dir(&self, path: &Path) -> Vec<String> {
        self.dirs.get(path).cloned().unwrap_or_default()
    }
}
