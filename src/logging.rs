//! # Diagnostics Module / 诊断日志模块
//!
//! Installs the `tracing` subscriber for the runner's own diagnostics
//! (spawned commands, kills, report failures). These go to stderr; stdout is
//! reserved for progress lines and for the output of targets that do not
//! capture.
//!
//! The level comes from `--log-level`, else from `SCRIPT_RUNNER_LOG`, else
//! `warn`, which keeps a normal run free of diagnostics.
//!
//! 为运行器自身的诊断信息安装 `tracing` 订阅器，输出到 stderr。
//! 级别依次取自 `--log-level`、`SCRIPT_RUNNER_LOG`，默认为 `warn`。

use anyhow::{Result, anyhow};
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Environment variable consulted when `--log-level` is absent.
pub const LOG_ENV_VAR: &str = "SCRIPT_RUNNER_LOG";

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let level = resolve_level(cli_level, std::env::var(LOG_ENV_VAR).ok().as_deref());

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install the diagnostics subscriber: {e}"))
}

/// Picks the level from the CLI flag or the raw value of [`LOG_ENV_VAR`].
/// An unrecognised environment value falls back to `warn`.
pub fn resolve_level(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Level {
    cli_level
        .map(Level::from)
        .or_else(|| env_value.and_then(|v| v.trim().parse::<Level>().ok()))
        .unwrap_or(Level::WARN)
}
