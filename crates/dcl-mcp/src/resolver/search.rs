//! Where to look for a command, in priority order.

use std::path::{Path, PathBuf};

use dcl_core::EnvProvider;

use super::fs::FsProvider;

/// A group of directories sharing one origin, searched in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Path,
    EtcPaths,
    PlatformDefault,
    NodeManager,
    Extra,
}

/// Builds the ordered directory lists for each [`Origin`].
pub struct SearchDirs<'a> {
    env: &'a dyn EnvProvider,
    fs: &'a dyn FsProvider,
}

impl<'a> SearchDirs<'a> {
    pub fn new(env: &'a dyn EnvProvider, fs: &'a dyn FsProvider) -> Self {
        Self { env, fs }
    }

    /// Directories for one origin. `command` matters only for node shims.
    pub fn dirs(&self, origin: Origin, command: &str, extra_var: &str) -> Vec<PathBuf> {
        match origin {
            Origin::Path => self.split_var("PATH"),
            Origin::EtcPaths => self.etc_paths(),
            Origin::PlatformDefault => platform_default_dirs().iter().map(PathBuf::from).collect(),
            Origin::NodeManager => self.node_manager_dirs(command),
            Origin::Extra => self.split_var(extra_var),
        }
    }

    fn split_var(&self, key: &str) -> Vec<PathBuf> {
        self.env
            .get(key)
            .map(|value| {
                std::env::split_paths(&value)
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Entries of `/etc/paths` and every file under `/etc/paths.d`.
    fn etc_paths(&self) -> Vec<PathBuf> {
        let mut files = vec![PathBuf::from("/etc/paths")];
        let mut extra: Vec<String> = self.fs.list_dir(Path::new("/etc/paths.d"));
        extra.sort();
        files.extend(extra.iter().map(|name| Path::new("/etc/paths.d").join(name)));

        files
            .iter()
            .filter_map(|file| self.fs.read_to_string(file))
            .flat_map(|contents| {
                contents
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(PathBuf::from)
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// asdf and volta shims, then nvm's default alias, then nvm versions newest first.
    fn node_manager_dirs(&self, command: &str) -> Vec<PathBuf> {
        if !matches!(command, "npm" | "npx" | "node") {
            return Vec::new();
        }
        let Some(home) = self.env.get("HOME").map(PathBuf::from) else {
            return Vec::new();
        };

        let mut dirs = vec![home.join(".asdf/shims"), home.join(".volta/bin")];

        let nvm = home.join(".nvm");
        if let Some(alias) = self.fs.read_to_string(&nvm.join("alias/default")) {
            let alias = alias.trim();
            if !alias.is_empty() {
                dirs.push(nvm.join("versions/node").join(alias).join("bin"));
            }
        }

        let mut versions = self.fs.list_dir(&nvm.join("versions/node"));
        versions.sort_by(|a, b| compare_versions(b, a));
        dirs.extend(
            versions
                .iter()
                .map(|version| nvm.join("versions/node").join(version).join("bin")),
        );

        dirs.dedup();
        dirs
    }

    /// File names to try for `command` inside one directory.
    pub fn file_names(&self, command: &str) -> Vec<String> {
        #[cfg(windows)]
        {
            let mut names = vec![command.to_string()];
            let pathext = self
                .env
                .var("PATHEXT")
                .unwrap_or_else(|| ".COM;.EXE;.BAT;.CMD".to_string());
            names.extend(
                pathext
                    .split(';')
                    .filter(|ext| !ext.is_empty())
                    .map(|ext| format!("{command}{}", ext.to_lowercase())),
            );
            names
        }

        #[cfg(not(windows))]
        {
            let _ = self;
            vec![command.to_string()]
        }
    }
}

/// Compare nvm version directory names (`v20.11.0`) numerically.
fn compare_versions(a: &str, b: &str) -> std::cmp::Ordering {
    let parts = |v: &str| -> Vec<u64> {
        v.trim_start_matches('v')
            .split('.')
            .map(|p| p.parse().unwrap_or(0))
            .collect()
    };
    parts(a).cmp(&parts(b))
}

const fn platform_default_dirs() -> &'static [&'static str] {
    if cfg!(target_os = "macos") {
        &["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin", "/bin"]
    } else if cfg!(windows) {
        &[]
    } else {
        &["/usr/local/bin", "/usr/bin", "/bin"]
    }
}
