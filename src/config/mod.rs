// src/config/mod.rs

//! Configuration loading and validation for assetflow.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate globs, pipeline references and acyclicity (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{
    AccessibilitySection, CommandConfig, ConfigFile, ImagesSection, LintSection, OutputSection,
    PathMapping, PathsSection, PipelineConfig, RawConfigFile, ScriptsSection, ServerSection,
    StylesSection, WatchConfig,
};
pub use validate::pipeline_build_order;
