//! Command resolution for subordinate server launch descriptors.
//!
//! Registry commands are usually bare names like `npx`, and the gateway is
//! often started by a host agent with a stripped-down `PATH`. Before a
//! subordinate is spawned its command is resolved to an absolute executable:
//!
//! 1. absolute paths (or paths containing a separator) are checked as given
//! 2. `PATH` from the gateway environment
//! 3. `/etc/paths` and `/etc/paths.d/*` (macOS)
//! 4. platform default directories
//! 5. Node.js version manager shims (asdf, volta, nvm) for `npm`/`npx`/`node`
//! 6. extra directories from `DCL_EXTRA_PATH`
//!
//! Every candidate checked is recorded so a failed resolution can say
//! exactly where it looked.

mod fs;
mod resolve;
mod search;
mod types;

pub use fs::{FsProvider, SystemFs};
pub use resolve::{EXTRA_PATH_VAR, resolve_command, resolve_command_with};
pub use types::{Probe, ProbeOutcome, Resolution, ResolveError};

#[cfg(test)]
pub use fs::MockFs;
