// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetflowError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Cycle detected in pipelines: {0}")]
    PipelineCycle(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A stage could not process one input file.
    ///
    /// Under a fail-open stream policy this drops the file instead of
    /// failing the task.
    #[error("{file}: {message}")]
    TransformFailed { file: String, message: String },

    #[error("{task}: {errors} lint error(s), {warnings} warning(s)")]
    LintFailed {
        task: String,
        errors: usize,
        warnings: usize,
    },

    #[error("command for task '{task}' exited with code {code}")]
    CommandFailed { task: String, code: i32 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AssetflowError {
    pub fn transform(file: impl Into<String>, message: impl Into<String>) -> Self {
        AssetflowError::TransformFailed {
            file: file.into(),
            message: message.into(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AssetflowError>;
