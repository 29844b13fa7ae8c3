//! CLI bootstrap - the composition root.
//!
//! The only place where the registry, launcher and gateway are wired
//! together. Handlers receive the composed [`CliContext`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dcl_core::{EnvProvider, GatewayConfig, build_registry, resolve_config_path};
use dcl_mcp::{CommandLauncher, Gateway, ProcessLauncher};

use crate::parser::Cli;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Override file to merge over the built-in servers, if any.
    pub config_path: Option<PathBuf>,
    /// Timeout budgets, environment first, then command-line flags.
    pub gateway: GatewayConfig,
}

impl CliConfig {
    /// Resolve configuration from parsed arguments and the environment.
    pub fn from_cli(cli: &Cli, env: &dyn EnvProvider) -> Self {
        let mut gateway = GatewayConfig::from_env(env);
        if let Some(secs) = cli.init_timeout {
            gateway = gateway.with_init_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = cli.operation_timeout {
            gateway = gateway.with_operation_timeout(Duration::from_secs(secs));
        }

        Self {
            config_path: resolve_config_path(cli.config.as_deref(), env),
            gateway,
        }
    }
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    pub gateway: Arc<Gateway>,
}

/// Build the registry and gateway.
///
/// Never fails: override file problems are logged and the built-in servers
/// are used. Missing credentials are reported once here and enforced per call.
pub fn bootstrap(config: &CliConfig, env: Arc<dyn EnvProvider>) -> CliContext {
    let registry = build_registry(config.config_path.as_deref(), env.as_ref());
    registry.warn_missing_credentials(env.as_ref());

    tracing::info!(
        servers = registry.len(),
        init_timeout_secs = config.gateway.init_timeout.as_secs(),
        operation_timeout_secs = config.gateway.operation_timeout.as_secs(),
        "DCL gateway ready"
    );

    let launcher: Arc<dyn ProcessLauncher> = Arc::new(CommandLauncher::new(Arc::clone(&env)));
    let gateway = Gateway::new(Arc::new(registry), env, launcher, config.gateway);

    CliContext {
        gateway: Arc::new(gateway),
    }
}
