use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Severity of a lint finding, also used as the failure threshold
/// (`[lint].fail_on`) and for per-rule overrides (`[lint.rules]`).
///
/// Ordered so that `Off < Warn < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Off,
    #[serde(alias = "warning")]
    Warn,
    Error,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Off => "off",
            Severity::Warn => "warning",
            Severity::Error => "error",
        };
        f.write_str(s)
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" => Ok(Severity::Off),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            other => Err(format!(
                "invalid severity: {other} (expected \"off\", \"warn\" or \"error\")"
            )),
        }
    }
}

/// Where optimized images are cached between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Store entries under `.assetflow/cache/images`.
    File,
    /// Keep entries in memory only (lost on restart).
    Memory,
}

impl Default for CacheMode {
    fn default() -> Self {
        CacheMode::File
    }
}

/// Output formatting for compiled style sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CssOutputStyle {
    Expanded,
    Compressed,
}

impl Default for CssOutputStyle {
    fn default() -> Self {
        CssOutputStyle::Expanded
    }
}

/// What a task tells the live-reload notifier after writing its outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyMode {
    None,
    /// Push the written files so clients can hot-swap them.
    Stream,
    /// Ask every client to do a full page reload.
    Reload,
}
