// src/resolve/mod.rs

//! Glob resolution.
//!
//! Patterns from `[paths.*]` and `[[watch]]` are compiled once into a
//! [`SourceSet`] and expanded into concrete files each time a task runs, so
//! files created after startup are picked up.

pub mod glob;
pub mod path_utils;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use tracing::debug;

use crate::errors::{AssetflowError, Result};
use crate::fs::FileSystem;

pub use glob::SourceGlob;
pub use path_utils::{normalize_relative, relative_str, to_slash};

/// A concrete input file produced by resolving a [`SourceSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path on disk (`root` joined with the matched relative path).
    pub path: PathBuf,
    /// Path relative to the matching glob's base; used for output naming.
    pub relative: PathBuf,
}

/// Ordered positive patterns plus `!` exclusions.
#[derive(Debug, Clone)]
pub struct SourceSet {
    include: Vec<SourceGlob>,
    exclude: Vec<SourceGlob>,
}

impl SourceSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> anyhow::Result<Self> {
        let mut include = Vec::new();
        let mut exclude = Vec::new();

        for pattern in patterns {
            let glob = SourceGlob::new(pattern.as_ref())?;
            if glob.is_negated() {
                exclude.push(glob);
            } else {
                include.push(glob);
            }
        }

        Ok(Self { include, exclude })
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.include
            .iter()
            .chain(self.exclude.iter())
            .map(|g| g.pattern())
    }

    /// Whether a forward-slash path relative to the project root is selected.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.include.iter().any(|g| g.is_match(rel_path)) && !self.is_excluded(rel_path)
    }

    fn is_excluded(&self, rel_path: &str) -> bool {
        self.exclude.iter().any(|g| g.is_match(rel_path))
    }

    /// Expand the set against `root`.
    ///
    /// - A glob whose base directory does not exist contributes nothing.
    /// - A plain (non-glob) path that does not exist is an error.
    /// - A file matched by several patterns is returned once, relative to
    ///   the first pattern that matched it.
    /// - Results are sorted by path for deterministic output.
    pub fn resolve(&self, fs: &dyn FileSystem, root: &Path) -> Result<Vec<SourceFile>> {
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut files = Vec::new();

        for glob in self.include.iter() {
            let base_dir = if glob.base().as_os_str().is_empty() {
                root.to_path_buf()
            } else {
                root.join(glob.base())
            };

            if !glob.is_glob() {
                let path = root.join(glob.pattern().trim_start_matches("./"));
                if !fs.is_file(&path) {
                    return Err(AssetflowError::Other(anyhow!(
                        "file not found with singular glob: {}",
                        glob.pattern()
                    )));
                }
                let rel = to_slash(path.strip_prefix(root).unwrap_or(&path));
                if !self.is_excluded(&rel) && seen.insert(path.clone()) {
                    let relative = PathBuf::from(path.file_name().unwrap_or_default());
                    files.push(SourceFile { path, relative });
                }
                continue;
            }

            if !fs.is_dir(&base_dir) {
                debug!(pattern = glob.pattern(), base = ?base_dir, "glob base missing; no files");
                continue;
            }

            for path in walk_files(fs, &base_dir)? {
                let Ok(rel) = path.strip_prefix(root) else {
                    continue;
                };
                let rel = to_slash(rel);
                if !glob.is_match(&rel) || self.is_excluded(&rel) {
                    continue;
                }
                if !seen.insert(path.clone()) {
                    continue;
                }
                let relative = path
                    .strip_prefix(&base_dir)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| PathBuf::from(path.file_name().unwrap_or_default()));
                files.push(SourceFile { path, relative });
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(count = files.len(), "resolved source files");
        Ok(files)
    }
}

/// Collect every file below `dir` (depth-first, unsorted).
fn walk_files(fs: &dyn FileSystem, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                files.push(path);
            }
        }
    }

    Ok(files)
}
