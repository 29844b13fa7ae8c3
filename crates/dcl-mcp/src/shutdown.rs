//! Subordinate teardown with SIGTERM → SIGKILL escalation.
//!
//! The launcher starts every subordinate as the leader of its own process
//! group, so the signals sent here also reach processes the subordinate
//! started itself, such as the node server behind `npx -y`.

use std::time::Duration;

use tokio::process::Child;
use tokio::time::timeout;

#[cfg(unix)]
use nix::sys::signal::{Signal, killpg};
#[cfg(unix)]
use nix::unistd::Pid;
#[cfg(unix)]
use tokio::time::{Instant, sleep};

/// How long a subordinate gets to exit on its own after stdin closes.
pub const EXIT_GRACE: Duration = Duration::from_millis(500);

/// How long the group gets between SIGTERM and SIGKILL.
pub const TERM_GRACE: Duration = Duration::from_millis(500);

#[cfg(unix)]
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// The process group a subordinate leads.
///
/// Dropping a handle that [`shutdown`] has not consumed SIGKILLs the whole
/// group. That covers a session future cancelled mid-flight, where
/// `kill_on_drop` alone would only reach the leader.
pub struct ProcessGroup {
    pgid: Option<u32>,
}

impl ProcessGroup {
    /// Group led by `child`. Call right after spawn, before the pid can be reaped.
    pub fn led_by(child: &Child) -> Self {
        Self { pgid: child.id() }
    }

    /// Send `signal` to every member; `None` only checks that one exists.
    ///
    /// Returns false once the group has no members left.
    #[cfg(unix)]
    fn signal(&self, signal: Option<Signal>) -> bool {
        let Some(pgid) = self.pgid.and_then(|pid| i32::try_from(pid).ok()) else {
            return false;
        };
        killpg(Pid::from_raw(pgid), signal).is_ok()
    }

    /// Poll until the group is empty, reaping the leader as it goes.
    #[cfg(unix)]
    async fn wait_empty(&self, leader: &mut Child, grace: Duration) -> bool {
        let deadline = Instant::now() + grace;
        loop {
            // An exited but unreaped leader still counts as a member
            let _ = leader.try_wait();
            if !self.signal(None) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    fn disarm(&mut self) {
        self.pgid = None;
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            if self.signal(Some(Signal::SIGKILL)) {
                tracing::debug!(pgid = ?self.pgid, "Killed abandoned subordinate group");
            }
        }
    }
}

/// Stop a subordinate whose stdin is already closed, and reap it.
///
/// 1. Wait [`EXIT_GRACE`] for the leader to exit on its own
/// 2. SIGTERM the group and wait up to [`TERM_GRACE`] for it to empty
/// 3. SIGKILL whatever is left
/// 4. Reap the leader
///
/// Step 2 runs even when the leader exited cleanly, since its children may not have.
pub async fn shutdown(name: &str, mut child: Child, mut group: ProcessGroup) {
    if let Ok(Err(e)) = timeout(EXIT_GRACE, child.wait()).await {
        tracing::warn!(server_name = %name, error = %e, "Failed to wait for subordinate");
    }

    #[cfg(unix)]
    stop_group(name, &mut child, &group).await;

    group.disarm();
    reap(name, &mut child).await;
}

#[cfg(unix)]
async fn stop_group(name: &str, child: &mut Child, group: &ProcessGroup) {
    if !group.signal(Some(Signal::SIGTERM)) {
        return;
    }
    if group.wait_empty(child, TERM_GRACE).await {
        tracing::debug!(server_name = %name, "Subordinate group terminated");
        return;
    }
    if group.signal(Some(Signal::SIGKILL)) {
        tracing::debug!(server_name = %name, "Subordinate group killed");
    }
}

async fn reap(name: &str, child: &mut Child) {
    match timeout(TERM_GRACE, child.wait()).await {
        Ok(Ok(status)) => tracing::debug!(server_name = %name, %status, "Subordinate exited"),
        Ok(Err(e)) => {
            tracing::warn!(server_name = %name, error = %e, "Failed to reap subordinate");
        }
        // No group signalling on this platform, or the leader left its group
        Err(_) => match child.kill().await {
            Ok(()) => tracing::debug!(server_name = %name, "Subordinate killed"),
            Err(e) => {
                tracing::warn!(server_name = %name, error = %e, "Failed to kill subordinate");
            }
        },
    }
}
