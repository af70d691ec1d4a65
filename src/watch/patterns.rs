// src/watch/patterns.rs

use std::fmt;
use std::sync::Arc;

use crate::config::WatchConfig;
use crate::errors::Result;
use crate::pipeline::{Task, TaskRegistry, series};
use crate::resolve::SourceSet;

/// A trigger glob set bound to the pipeline it runs.
#[derive(Clone)]
pub struct WatchBinding {
    label: String,
    trigger: SourceSet,
    pipeline: Arc<dyn Task>,
}

impl fmt::Debug for WatchBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchBinding")
            .field("label", &self.label)
            .field("trigger", &self.trigger.patterns().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl WatchBinding {
    pub fn new(label: impl Into<String>, trigger: SourceSet, pipeline: Arc<dyn Task>) -> Self {
        Self {
            label: label.into(),
            trigger,
            pipeline,
        }
    }

    /// Resolve a `[[watch]]` entry against the registry. Several `run`
    /// names become a series.
    pub fn from_config(cfg: &WatchConfig, registry: &TaskRegistry) -> Result<Self> {
        let trigger = SourceSet::new(&cfg.patterns)?;
        let mut tasks = registry.get_all(&cfg.run)?;
        let pipeline = if tasks.len() == 1 {
            tasks.remove(0)
        } else {
            series(tasks)
        };
        Ok(Self::new(cfg.run.join(", "), trigger, pipeline))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pipeline(&self) -> Arc<dyn Task> {
        Arc::clone(&self.pipeline)
    }

    /// `rel_path` is relative to the project root, with forward slashes.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.trigger.matches(rel_path)
    }
}

/// Resolve every configured binding.
pub fn build_watch_bindings(
    configs: &[WatchConfig],
    registry: &TaskRegistry,
) -> Result<Vec<WatchBinding>> {
    configs
        .iter()
        .map(|cfg| WatchBinding::from_config(cfg, registry))
        .collect()
}
