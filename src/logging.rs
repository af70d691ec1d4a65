// src/logging.rs

//! Logging setup for `assetflow` using `tracing` + `tracing-subscriber`.
//!
//! The filter comes from, in order:
//! 1. `--log-level` (applies to assetflow's own events)
//! 2. `ASSETFLOW_LOG`: a bare level, or full `EnvFilter` directives such as
//!    `assetflow::watch=debug,tower_http=info`
//! 3. [`DEFAULT_DIRECTIVES`]
//!
//! Dependencies stay at `warn` unless a directive names them. Logs go to
//! STDERR; STDOUT is reserved for lint / accessibility reports and echoed
//! command output.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "ASSETFLOW_LOG";

pub const DEFAULT_DIRECTIVES: &str = "warn,assetflow=info";

/// Initialise the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let filter = build_filter(cli_level, env.as_deref())?;

    fmt()
        .compact()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))?;

    Ok(())
}

/// Resolve the filter for a CLI level and the raw `ASSETFLOW_LOG` value.
pub fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = cli_level {
        return Ok(EnvFilter::new(crate_directives(level_name(level))));
    }

    let Some(raw) = env.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(EnvFilter::new(DEFAULT_DIRECTIVES));
    };

    match parse_level_str(raw) {
        Some(level) => Ok(EnvFilter::new(crate_directives(level))),
        None => EnvFilter::try_new(raw).with_context(|| format!("invalid {LOG_ENV} value {raw:?}")),
    }
}

fn crate_directives(level: &str) -> String {
    format!("warn,assetflow={level}")
}

fn level_name(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

fn parse_level_str(s: &str) -> Option<&'static str> {
    match s.to_lowercase().as_str() {
        "error" => Some("error"),
        "warn" | "warning" => Some("warn"),
        "info" => Some("info"),
        "debug" => Some("debug"),
        "trace" => Some("trace"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directives(cli: Option<LogLevel>, env: Option<&str>) -> String {
        build_filter(cli, env).unwrap().to_string()
    }

    #[test]
    fn default_keeps_dependencies_quiet() {
        let shown = directives(None, None);
        assert!(shown.contains("assetflow=info"), "{shown}");
        assert!(shown.contains("warn"), "{shown}");
        assert_eq!(directives(None, Some("  ")), shown);
    }

    #[test]
    fn cli_level_wins_over_env() {
        let shown = directives(Some(LogLevel::Debug), Some("trace"));
        assert!(shown.contains("assetflow=debug"), "{shown}");
    }

    #[test]
    fn bare_env_level_targets_the_crate() {
        let shown = directives(None, Some("WARNING"));
        assert!(shown.contains("assetflow=warn"), "{shown}");
    }

    #[test]
    fn env_accepts_full_directives() {
        let shown = directives(None, Some("assetflow::watch=trace,tower_http=debug"));
        assert!(shown.contains("assetflow::watch=trace"), "{shown}");
        assert!(shown.contains("tower_http=debug"), "{shown}");
    }

    #[test]
    fn malformed_env_is_an_error() {
        let err = build_filter(None, Some("assetflow=loud")).unwrap_err();
        assert!(err.to_string().contains(LOG_ENV));
    }
}
