// src/lib.rs

pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod filters;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod resolve;
pub mod server;
pub mod stream;
pub mod tasks;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{default_config_path, load_or_default};
use crate::fs::RealFileSystem;
use crate::pipeline::{BuildContext, render_tree, run_logged};
use crate::tasks::build_registry;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - task registry assembly
/// - `--list` / `--dry-run`
/// - running the selected task
pub async fn run(args: CliArgs) -> Result<()> {
    let explicit = args.config.as_deref().map(Path::new);
    let cfg = load_or_default(explicit)?;

    let config_path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);
    let root = config_root_dir(&config_path);
    debug!(root = %root.display(), "project root");

    let registry = Arc::new(build_registry(&cfg)?);

    if args.list {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let task = registry.get(&args.task)?;

    if args.dry_run {
        print!("{}", render_tree(task.as_ref()));
        debug!("dry-run complete (no execution)");
        return Ok(());
    }

    let ctx = BuildContext::builder(root, cfg)
        .fs(Arc::new(RealFileSystem))
        .registry(Arc::clone(&registry))
        .build();

    info!(task = %args.task, "running");
    run_logged(task, ctx).await?;
    Ok(())
}

/// Figure out the project root.
///
/// - If the config path has a non-empty parent (e.g. "site/Assetflow.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Assetflow.toml" (parent = ""),
///   we fall back to the current working directory "."
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
