// src/tasks/asset.rs

//! Generic asset task: resolve → read → stage chain → write → notify.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{Span, debug, info};

use crate::errors::{AssetflowError, Result};
use crate::pipeline::{BuildContext, Task, TaskFuture};
use crate::resolve::{SourceSet, relative_str, to_slash};
use crate::stream::{FileRecord, StageChain};
use crate::types::NotifyMode;

/// Builds a fresh stage chain for one run.
pub type ChainFactory = Box<dyn Fn(&BuildContext) -> Result<StageChain> + Send + Sync>;

pub struct AssetTask {
    inner: Arc<AssetTaskInner>,
}

struct AssetTaskInner {
    name: String,
    sources: SourceSet,
    dest: Option<PathBuf>,
    chain: ChainFactory,
    notify: NotifyMode,
}

impl AssetTask {
    /// `dest` is relative to the project root; `None` for tasks that only
    /// inspect their inputs (lint, audits).
    pub fn new(
        name: impl Into<String>,
        sources: SourceSet,
        dest: Option<PathBuf>,
        notify: NotifyMode,
        chain: ChainFactory,
    ) -> Self {
        Self {
            inner: Arc::new(AssetTaskInner {
                name: name.into(),
                sources,
                dest,
                chain,
                notify,
            }),
        }
    }
}

/// Resolve `sources` and load each file as a record whose origin is its
/// path relative to the project root.
pub fn read_sources(task: &str, sources: &SourceSet, ctx: &BuildContext) -> Result<Vec<FileRecord>> {
    let fs = ctx.fs();
    let root = ctx.root();

    let files = sources.resolve(fs.as_ref(), root)?;
    debug!(task = %task, inputs = files.len(), "resolved sources");

    let mut records = Vec::with_capacity(files.len());
    for file in files {
        let contents = fs.read(&file.path)?;
        let origin = file.path.strip_prefix(root).unwrap_or(&file.path).to_path_buf();
        records.push(FileRecord::new(file.relative, contents).with_origin(origin));
    }
    Ok(records)
}

impl AssetTaskInner {
    /// Blocking part of a run. Returns the absolute paths written.
    fn execute(&self, ctx: &BuildContext) -> Result<Vec<PathBuf>> {
        let fs = ctx.fs();
        let records = read_sources(&self.name, &self.sources, ctx)?;

        let chain = (self.chain)(ctx)?;
        let outputs = chain.run(records)?;

        let Some(dest) = &self.dest else {
            return Ok(Vec::new());
        };

        let dest_dir = ctx.resolve(dest);
        let mut written = Vec::with_capacity(outputs.len());
        for out in outputs {
            let target = dest_dir.join(out.relative_path());
            fs.write(&target, &out.contents)?;
            written.push(target);
        }

        info!(task = %self.name, dest = %to_slash(dest), files = written.len(), "wrote outputs");
        Ok(written)
    }

    fn notify(&self, ctx: &BuildContext, written: &[PathBuf]) {
        match self.notify {
            NotifyMode::None => {}
            NotifyMode::Reload => {
                ctx.notifier().reload();
            }
            NotifyMode::Stream => {
                let output_root = ctx.output_root();
                let paths: Vec<String> = written
                    .iter()
                    .filter_map(|p| relative_str(&output_root, p))
                    .collect();
                ctx.notifier().stream(paths);
            }
        }
    }
}

impl Task for AssetTask {
    fn name(&self) -> &str {
        &self.inner.name
    }

    fn run(&self, ctx: BuildContext) -> TaskFuture {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            let blocking_inner = Arc::clone(&inner);
            let blocking_ctx = ctx.clone();
            let span = Span::current();
            let written = tokio::task::spawn_blocking(move || {
                span.in_scope(|| blocking_inner.execute(&blocking_ctx))
            })
                .await
                .map_err(|e| AssetflowError::Other(anyhow!("task '{}' panicked: {e}", inner.name)))??;

            inner.notify(&ctx, &written);
            Ok(())
        })
    }
}
