//! Ephemeral subordinate sessions.
//!
//! [`SessionManager::with_session`] spawns one subordinate, performs the
//! `initialize` handshake under the init budget, runs a body against the
//! live [`Session`], then tears down the subordinate's whole process group
//! on every exit path.
//! Requests made through a `Session` are bounded by the operation budget.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dcl_core::config::format_budget;
use dcl_core::{GatewayConfig, GatewayError, McpTool, OperationResult, ServerDescriptor};
use serde_json::{Map, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{ChildStderr, ChildStdin, ChildStdout};
use tokio::sync::watch;

use crate::client::{McpClient, McpClientError};
use crate::launcher::{LaunchError, ProcessLauncher};
use crate::shutdown::{ProcessGroup, shutdown};

/// How long to wait for buffered stderr after the subordinate hung up.
const STDERR_SETTLE: Duration = Duration::from_millis(200);

/// Stderr lines retained for diagnostics.
const STDERR_TAIL_LINES: usize = 20;

/// Boxed future returned by a session body, borrowing the session.
pub type SessionFuture<'s, T> = Pin<Box<dyn Future<Output = Result<T, GatewayError>> + Send + 's>>;

type ChildClient = McpClient<BufReader<ChildStdout>, ChildStdin>;

/// Last lines a subordinate wrote to stderr.
///
/// A background task forwards every line to `tracing` and keeps a bounded
/// tail; it ends when the subordinate closes stderr.
#[derive(Clone)]
pub struct StderrTail {
    lines: Arc<Mutex<VecDeque<String>>>,
    finished: watch::Receiver<bool>,
}

impl StderrTail {
    fn spawn(server_name: &str, stderr: ChildStderr) -> Self {
        let lines = Arc::new(Mutex::new(VecDeque::with_capacity(STDERR_TAIL_LINES)));
        let (done_tx, finished) = watch::channel(false);

        let sink = Arc::clone(&lines);
        let server_name = server_name.to_string();
        tokio::spawn(async move {
            let mut reader = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = reader.next_line().await {
                tracing::debug!(server_name = %server_name, "stderr: {line}");
                if let Ok(mut tail) = sink.lock() {
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
            }
            let _ = done_tx.send(true);
        });

        Self { lines, finished }
    }

    /// Current tail, oldest line first.
    pub fn snapshot(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|tail| tail.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Tail after giving the reader a moment to drain a closed pipe.
    async fn settled(&self) -> Vec<String> {
        let mut finished = self.finished.clone();
        let _ = tokio::time::timeout(STDERR_SETTLE, finished.wait_for(|done| *done)).await;
        self.snapshot()
    }
}

/// A live, initialized connection to one subordinate.
pub struct Session {
    name: String,
    client: ChildClient,
    operation_timeout: Duration,
    stderr: StderrTail,
}

impl Session {
    pub fn server_name(&self) -> &str {
        &self.name
    }

    /// `tools/list`, bounded by the operation budget.
    pub async fn list_tools(&self) -> Result<Vec<McpTool>, GatewayError> {
        self.bounded("tools/list", self.client.list_tools()).await
    }

    /// `tools/call`, bounded by the operation budget.
    pub async fn call_tool(
        &self,
        tool: &str,
        arguments: Map<String, Value>,
    ) -> Result<OperationResult, GatewayError> {
        let operation = format!("tools/call '{tool}'");
        self.bounded(&operation, self.client.call_tool(tool, arguments))
            .await
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        request: impl Future<Output = Result<T, McpClientError>> + Send,
    ) -> Result<T, GatewayError> {
        match tokio::time::timeout(self.operation_timeout, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(self.subordinate_error(&e).await),
            Err(_) => {
                tracing::warn!(
                    server_name = %self.name,
                    operation,
                    timeout = %format_budget(self.operation_timeout),
                    "Operation timed out"
                );
                Err(GatewayError::OperationTimeout {
                    name: self.name.clone(),
                    operation: operation.to_string(),
                    timeout: self.operation_timeout,
                })
            }
        }
    }

    async fn subordinate_error(&self, error: &McpClientError) -> GatewayError {
        let tail = if matches!(error, McpClientError::Closed) {
            self.stderr.settled().await
        } else {
            self.stderr.snapshot()
        };
        GatewayError::subordinate(&self.name, error, &tail)
    }
}

/// Opens one subordinate session per call and guarantees its teardown.
pub struct SessionManager {
    launcher: Arc<dyn ProcessLauncher>,
    config: GatewayConfig,
}

impl SessionManager {
    pub fn new(launcher: Arc<dyn ProcessLauncher>, config: GatewayConfig) -> Self {
        Self { launcher, config }
    }

    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Spawn and initialize `descriptor`, run `body`, then tear down.
    ///
    /// The body's result is returned unchanged. The process is reaped
    /// before this returns, whether the body succeeded, failed or timed out.
    pub async fn with_session<T, F>(
        &self,
        descriptor: &ServerDescriptor,
        body: F,
    ) -> Result<T, GatewayError>
    where
        F: for<'s> FnOnce(&'s Session) -> SessionFuture<'s, T>,
    {
        let name = descriptor.name.as_str();

        let mut child = self
            .launcher
            .launch(descriptor)
            .map_err(|e| GatewayError::subordinate(name, &e, &[]))?;
        let group = ProcessGroup::led_by(&child);

        let pipes = (child.stdin.take(), child.stdout.take(), child.stderr.take());
        let (Some(stdin), Some(stdout), Some(stderr)) = pipes else {
            shutdown(name, child, group).await;
            let missing = LaunchError::MissingPipe("stdio");
            return Err(GatewayError::subordinate(name, &missing, &[]));
        };

        let session = Session {
            name: name.to_string(),
            client: McpClient::new(name, BufReader::new(stdout), stdin),
            operation_timeout: self.config.operation_timeout,
            stderr: StderrTail::spawn(name, stderr),
        };

        let outcome = match self.initialize(&session).await {
            Ok(()) => body(&session).await,
            Err(e) => Err(e),
        };

        // Dropping the client closes the subordinate's stdin
        drop(session);
        shutdown(name, child, group).await;

        outcome
    }

    async fn initialize(&self, session: &Session) -> Result<(), GatewayError> {
        let init_timeout = self.config.init_timeout;
        match tokio::time::timeout(init_timeout, session.client.initialize()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(session.subordinate_error(&e).await),
            Err(_) => {
                tracing::warn!(
                    server_name = %session.name,
                    timeout = %format_budget(init_timeout),
                    "Initialization timed out"
                );
                Err(GatewayError::InitTimeout {
                    name: session.name.clone(),
                    timeout: init_timeout,
                })
            }
        }
    }
}
