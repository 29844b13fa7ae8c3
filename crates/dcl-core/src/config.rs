//! Gateway-wide configuration.
//!
//! Two independent timeout budgets bound every subordinate session:
//! process spawn + `initialize` handshake, and the substantive request
//! (`tools/list` or `tools/call`).

use std::time::Duration;

use crate::env::EnvProvider;

/// Environment variable overriding the init timeout (seconds).
pub const INIT_TIMEOUT_VAR: &str = "DCL_INIT_TIMEOUT";

/// Environment variable overriding the operation timeout (seconds).
pub const OPERATION_TIMEOUT_VAR: &str = "DCL_OPERATION_TIMEOUT";

/// Environment variable naming the server override file.
pub const CONFIG_PATH_VAR: &str = "DCL_CONFIG";

/// Default budget for spawn + handshake.
pub const DEFAULT_INIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default budget for a list or invoke request.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(300);

/// Timeout budgets applied to each subordinate session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Budget for spawning the subordinate and completing `initialize`.
    pub init_timeout: Duration,
    /// Budget for the list or invoke request issued on a live session.
    pub operation_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            init_timeout: DEFAULT_INIT_TIMEOUT,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    /// Read both budgets from the environment, keeping defaults for unset,
    /// unparsable or zero values.
    pub fn from_env(env: &dyn EnvProvider) -> Self {
        Self {
            init_timeout: seconds_from_env(env, INIT_TIMEOUT_VAR, DEFAULT_INIT_TIMEOUT),
            operation_timeout: seconds_from_env(
                env,
                OPERATION_TIMEOUT_VAR,
                DEFAULT_OPERATION_TIMEOUT,
            ),
        }
    }

    #[must_use]
    pub const fn with_init_timeout(mut self, timeout: Duration) -> Self {
        self.init_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }
}

/// Human form of a budget: whole seconds as `30s`, anything finer as `1500ms`.
pub fn format_budget(budget: Duration) -> String {
    if budget.subsec_nanos() == 0 {
        format!("{}s", budget.as_secs())
    } else {
        format!("{}ms", budget.as_millis())
    }
}

fn seconds_from_env(env: &dyn EnvProvider, key: &str, default: Duration) -> Duration {
    let Some(raw) = env.var(key) else {
        return default;
    };

    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            tracing::warn!(
                variable = key,
                value = %raw,
                default_secs = default.as_secs(),
                "Ignoring invalid timeout override"
            );
            default
        }
    }
}
