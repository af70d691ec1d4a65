// src/pipeline/context.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::ImageCache;
use crate::config::ConfigFile;
use crate::fs::{FileSystem, RealFileSystem};
use crate::pipeline::{ReportSink, TaskRegistry};
use crate::server::LiveReload;

/// Everything a task needs at run time. Cheap to clone.
#[derive(Clone)]
pub struct BuildContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    root: PathBuf,
    config: ConfigFile,
    fs: Arc<dyn FileSystem>,
    registry: Arc<TaskRegistry>,
    notifier: LiveReload,
    image_cache: Arc<ImageCache>,
    reports: ReportSink,
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("root", &self.inner.root)
            .field("registry", &self.inner.registry)
            .finish_non_exhaustive()
    }
}

impl BuildContext {
    pub fn builder(root: impl Into<PathBuf>, config: ConfigFile) -> BuildContextBuilder {
        BuildContextBuilder {
            root: root.into(),
            config,
            fs: None,
            registry: None,
            notifier: None,
            image_cache: None,
            reports: None,
        }
    }

    /// Project root; every configured path is relative to it.
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    pub fn config(&self) -> &ConfigFile {
        &self.inner.config
    }

    pub fn fs(&self) -> Arc<dyn FileSystem> {
        Arc::clone(&self.inner.fs)
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.inner.registry
    }

    pub fn notifier(&self) -> &LiveReload {
        &self.inner.notifier
    }

    pub fn image_cache(&self) -> Arc<ImageCache> {
        Arc::clone(&self.inner.image_cache)
    }

    /// Sink for lint and accessibility reports.
    pub fn reports(&self) -> &ReportSink {
        &self.inner.reports
    }

    /// Absolute path of `[output].root`.
    pub fn output_root(&self) -> PathBuf {
        self.inner.root.join(&self.inner.config.output.root)
    }

    pub fn resolve(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.inner.root.join(rel)
    }
}

pub struct BuildContextBuilder {
    root: PathBuf,
    config: ConfigFile,
    fs: Option<Arc<dyn FileSystem>>,
    registry: Option<Arc<TaskRegistry>>,
    notifier: Option<LiveReload>,
    image_cache: Option<Arc<ImageCache>>,
    reports: Option<ReportSink>,
}

impl BuildContextBuilder {
    pub fn fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    pub fn registry(mut self, registry: Arc<TaskRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn notifier(mut self, notifier: LiveReload) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn image_cache(mut self, cache: Arc<ImageCache>) -> Self {
        self.image_cache = Some(cache);
        self
    }

    pub fn reports(mut self, sink: ReportSink) -> Self {
        self.reports = Some(sink);
        self
    }

    /// Missing parts default to the real filesystem, an empty registry, a
    /// fresh notifier, the cache selected by `[images].cache` and reports on
    /// stdout.
    pub fn build(self) -> BuildContext {
        let fs = self.fs.unwrap_or_else(|| Arc::new(RealFileSystem));
        let image_cache = self.image_cache.unwrap_or_else(|| {
            Arc::new(ImageCache::for_mode(
                self.config.images.cache,
                &self.root,
                Arc::clone(&fs),
            ))
        });

        BuildContext {
            inner: Arc::new(ContextInner {
                root: self.root,
                config: self.config,
                fs,
                registry: self.registry.unwrap_or_default(),
                notifier: self.notifier.unwrap_or_default(),
                image_cache,
                reports: self.reports.unwrap_or_default(),
            }),
        }
    }
}
