//! Shared fixtures for dcl-mcp integration tests.
//!
//! Subordinate servers are `/bin/sh` scripts that speak canned JSON-RPC
//! lines, so the tests need nothing beyond a POSIX shell.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dcl_core::{EnvProvider, GatewayConfig, MockEnv, Registry, ServerDescriptor};
use dcl_mcp::{CommandLauncher, Gateway, LaunchError, ProcessLauncher};
use tokio::process::Child;

/// Reply to the gateway's `initialize` request.
pub const INIT_OK: &str = r#"{"jsonrpc":"2.0","id":1,"result":{"protocolVersion":"2025-06-18","capabilities":{"tools":{}},"serverInfo":{"name":"script","version":"0"}}}"#;

/// `tools/list` reply of the echo server.
pub const ECHO_TOOLS: &str = r#"{"jsonrpc":"2.0","id":2,"result":{"tools":[{"name":"ping","description":"replies pong","inputSchema":{"type":"object"}}]}}"#;

/// `tools/call` reply of the echo server.
pub const ECHO_PONG: &str = r#"{"jsonrpc":"2.0","id":2,"result":{"content":[{"type":"text","text":"pong"}]}}"#;

/// Script that completes the handshake, answers one request by method,
/// then waits for stdin to close.
pub fn responder(list_reply: &str, call_reply: &str) -> String {
    format!(
        "read _; printf '%s\\n' '{INIT_OK}'; read _; read req; \
         case \"$req\" in \
           *tools/list*) printf '%s\\n' '{list_reply}';; \
           *tools/call*) printf '%s\\n' '{call_reply}';; \
         esac; \
         read _"
    )
}

/// The scripted `echo` server: one tool `ping` that replies `pong`.
pub fn echo_script() -> String {
    responder(ECHO_TOOLS, ECHO_PONG)
}

/// Never answers `initialize`.
pub fn init_hang_script() -> String {
    "exec sleep 30".to_string()
}

/// Completes the handshake, then never answers.
pub fn request_hang_script() -> String {
    format!("read _; printf '%s\\n' '{INIT_OK}'; read _; read _; exec sleep 30")
}

/// Completes the handshake, then dies with a message on stderr.
pub fn crash_script() -> String {
    format!(
        "read _; printf '%s\\n' '{INIT_OK}'; read _; read _; \
         echo 'fatal: upstream exploded' >&2; exit 3"
    )
}

/// Descriptor running `script` under `sh -c`.
pub fn script_server(name: &str, description: &str, script: &str) -> ServerDescriptor {
    ServerDescriptor::new(name, "sh", description).with_args(["-c", script])
}

/// Environment with the real `PATH` and `HOME`, so `sh` resolves.
pub fn test_env() -> MockEnv {
    let mut env = MockEnv::new();
    for key in ["PATH", "HOME"] {
        if let Some(value) = std::env::var_os(key) {
            env = env.with_var(key, value);
        }
    }
    env
}

/// Whether `pid` is a live, non-zombie process.
pub fn is_running(pid: u32) -> bool {
    // Zombies wait on a reparented reaper; they are not running
    if let Ok(stat) = std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        return stat
            .rsplit_once(')')
            .is_some_and(|(_, state)| !state.trim_start().starts_with('Z'));
    }
    std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stderr(std::process::Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

/// Hangs in the handshake after starting a background process whose pid
/// it writes to `pid_file`, like `npx` starting the real server.
pub fn forking_hang_script(pid_file: &std::path::Path) -> String {
    format!("sleep 120 & echo $! > '{}'; wait", pid_file.display())
}

/// Short budgets so hang scenarios finish quickly.
pub fn fast_config() -> GatewayConfig {
    GatewayConfig::default()
        .with_init_timeout(Duration::from_secs(2))
        .with_operation_timeout(Duration::from_secs(2))
}

/// Launcher that counts spawns and remembers child pids.
pub struct CountingLauncher {
    inner: CommandLauncher,
    spawns: AtomicUsize,
    pids: Mutex<Vec<u32>>,
}

impl CountingLauncher {
    pub fn new(env: Arc<dyn EnvProvider>) -> Self {
        Self {
            inner: CommandLauncher::new(env),
            spawns: AtomicUsize::new(0),
            pids: Mutex::new(Vec::new()),
        }
    }

    pub fn spawn_count(&self) -> usize {
        self.spawns.load(Ordering::SeqCst)
    }

    pub fn pids(&self) -> Vec<u32> {
        self.pids.lock().unwrap().clone()
    }

    /// Assert that no child spawned so far is still running.
    pub fn assert_no_survivors(&self) {
        for pid in self.pids() {
            assert!(!is_running(pid), "subordinate pid {pid} is still running");
        }
    }
}

impl ProcessLauncher for CountingLauncher {
    fn launch(&self, descriptor: &ServerDescriptor) -> Result<Child, LaunchError> {
        self.spawns.fetch_add(1, Ordering::SeqCst);
        let child = self.inner.launch(descriptor)?;
        if let Some(pid) = child.id() {
            self.pids.lock().unwrap().push(pid);
        }
        Ok(child)
    }
}

/// Gateway over `registry` using a counting launcher.
pub fn gateway(
    registry: Registry,
    env: MockEnv,
    config: GatewayConfig,
) -> (Gateway, Arc<CountingLauncher>) {
    let env: Arc<dyn EnvProvider> = Arc::new(env);
    let launcher = Arc::new(CountingLauncher::new(Arc::clone(&env)));
    let gateway = Gateway::new(
        Arc::new(registry),
        env,
        Arc::clone(&launcher) as Arc<dyn ProcessLauncher>,
        config,
    );
    (gateway, launcher)
}
