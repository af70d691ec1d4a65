use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use assetflow::config::ConfigFile;
use assetflow::fs::RealFileSystem;
use assetflow::pipeline::{BuildContext, BuildContextBuilder, ReportSink};
use assetflow::server::LiveReload;
use assetflow::tasks::build_registry;
use tempfile::TempDir;

/// A throwaway project directory for end-to-end task tests.
pub struct TempProject {
    dir: TempDir,
}

impl TempProject {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp project"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn write(&self, rel: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn read(&self, rel: &str) -> Vec<u8> {
        fs::read(self.path(rel)).unwrap_or_else(|e| panic!("reading {rel}: {e}"))
    }

    pub fn read_string(&self, rel: &str) -> String {
        String::from_utf8(self.read(rel)).unwrap()
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    /// Every file below `rel`, as sorted forward-slash paths relative to it.
    pub fn files_under(&self, rel: &str) -> Vec<String> {
        let base = self.path(rel);
        let mut out = Vec::new();
        let mut stack = vec![base.clone()];
        while let Some(dir) = stack.pop() {
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    stack.push(path);
                } else {
                    let rel = path.strip_prefix(&base).unwrap();
                    out.push(rel.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        out.sort();
        out
    }

    /// Context over the real filesystem with the registry built from `cfg`.
    pub fn context(&self, cfg: ConfigFile) -> BuildContext {
        self.context_with(cfg, LiveReload::new())
    }

    pub fn context_with(&self, cfg: ConfigFile, notifier: LiveReload) -> BuildContext {
        self.builder(cfg).notifier(notifier).build()
    }

    /// Like [`TempProject::context`], with reports collected in the
    /// returned sink instead of printed.
    pub fn context_capturing(&self, cfg: ConfigFile) -> (BuildContext, ReportSink) {
        let sink = ReportSink::buffer();
        let ctx = self.builder(cfg).reports(sink.clone()).build();
        (ctx, sink)
    }

    fn builder(&self, cfg: ConfigFile) -> BuildContextBuilder {
        let registry = build_registry(&cfg).expect("build registry");
        BuildContext::builder(self.root(), cfg)
            .fs(Arc::new(RealFileSystem))
            .registry(Arc::new(registry))
    }
}

impl Default for TempProject {
    fn default() -> Self {
        Self::new()
    }
}
