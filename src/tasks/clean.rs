// src/tasks/clean.rs

use std::path::Path;

use anyhow::anyhow;
use tracing::{Span, debug, info};

use crate::errors::{AssetflowError, Result};
use crate::fs::FileSystem;
use crate::pipeline::{BuildContext, Task, TaskFuture};

/// Empty the output root, keeping the directory itself.
#[derive(Debug, Default)]
pub struct CleanTask;

pub fn clean_dir(fs: &dyn FileSystem, dir: &Path) -> Result<usize> {
    if !fs.is_dir(dir) {
        debug!(dir = %dir.display(), "output root missing; nothing to clean");
        return Ok(0);
    }

    let entries = fs.read_dir(dir)?;
    for entry in &entries {
        if fs.is_dir(entry) {
            fs.remove_dir_all(entry)?;
        } else {
            fs.remove_file(entry)?;
        }
    }
    Ok(entries.len())
}

impl Task for CleanTask {
    fn name(&self) -> &str {
        "clean"
    }

    fn run(&self, ctx: BuildContext) -> TaskFuture {
        Box::pin(async move {
            let dir = ctx.output_root();
            let fs = ctx.fs();
            let span = Span::current();
            let removed = tokio::task::spawn_blocking(move || span.in_scope(|| clean_dir(fs.as_ref(), &dir)))
                .await
                .map_err(|e| AssetflowError::Other(anyhow!("clean panicked: {e}")))??;
            info!(removed, "cleaned output root");
            Ok(())
        })
    }
}
