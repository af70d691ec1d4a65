// src/stream/mod.rs

//! File-record streams.
//!
//! An asset task turns its resolved sources into [`FileRecord`]s and pushes
//! them through a [`StageChain`]. Each [`Stage`] maps one record to zero or
//! one record (or fails); aggregating stages such as concatenation emit
//! their output from [`Stage::finish`], which is fed through the remaining
//! stages.
//!
//! What happens when a stage fails is decided by the chain's
//! [`StreamPolicy`], not by the stage.

pub mod sourcemap;

use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::errors::{AssetflowError, Result};
use crate::resolve::to_slash;

pub use sourcemap::{SourceMap, SourceMapBegin, SourceMapWrite};

/// A file travelling through a task's stage chain.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    /// Output path relative to the task's destination directory.
    pub relative: PathBuf,
    /// Where the record was read from, if it came from disk.
    pub origin: Option<PathBuf>,
    pub contents: Vec<u8>,
    pub source_map: Option<SourceMap>,
}

impl FileRecord {
    pub fn new(relative: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            relative: relative.into(),
            origin: None,
            contents: contents.into(),
            source_map: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<PathBuf>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Name used in logs and reports: the origin if known, else the
    /// relative output path.
    pub fn display_path(&self) -> String {
        match &self.origin {
            Some(p) => to_slash(p),
            None => to_slash(&self.relative),
        }
    }

    /// Contents as UTF-8, or a `TransformFailed` naming this file.
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.contents)
            .map_err(|e| AssetflowError::transform(self.display_path(), format!("not UTF-8: {e}")))
    }

    pub fn extension(&self) -> Option<&str> {
        self.relative.extension().and_then(|e| e.to_str())
    }

    pub fn file_name(&self) -> String {
        self.relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn set_extension(&mut self, ext: &str) {
        self.relative.set_extension(ext);
    }

    pub fn relative_slash(&self) -> String {
        to_slash(&self.relative)
    }

    pub fn relative_path(&self) -> &Path {
        &self.relative
    }
}

/// One step of a stream.
pub trait Stage: Send {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Transform one record. `Ok(None)` drops it from the stream.
    fn process(&mut self, record: FileRecord) -> Result<Option<FileRecord>>;

    /// Called once after every input has been processed. Records returned
    /// here continue through the stages that follow this one.
    fn finish(&mut self) -> Result<Vec<FileRecord>> {
        Ok(Vec::new())
    }
}

/// What to do when a stage reports an error for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPolicy {
    /// Any error aborts the whole stream.
    FailFast,
    /// `TransformFailed` is logged and the record dropped; any other error
    /// still aborts.
    FailOpen,
}

impl StreamPolicy {
    fn on_error(self, stage: &str, err: AssetflowError) -> Result<Option<FileRecord>> {
        match (self, err) {
            (StreamPolicy::FailOpen, AssetflowError::TransformFailed { file, message }) => {
                error!(stage, file = %file, "{message}");
                Ok(None)
            }
            (_, err) => Err(err),
        }
    }
}

/// Ordered stages plus the policy applied to their failures.
pub struct StageChain {
    stages: Vec<Box<dyn Stage>>,
    policy: StreamPolicy,
}

impl std::fmt::Debug for StageChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.stages.iter().map(|s| s.name()).collect();
        f.debug_struct("StageChain")
            .field("stages", &names)
            .field("policy", &self.policy)
            .finish()
    }
}

impl StageChain {
    pub fn new(policy: StreamPolicy) -> Self {
        Self {
            stages: Vec::new(),
            policy,
        }
    }

    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn push(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every input through the chain, then flush the stages in order.
    pub fn run(mut self, inputs: Vec<FileRecord>) -> Result<Vec<FileRecord>> {
        let mut outputs = Vec::new();

        for record in inputs {
            if let Some(out) = self.push_from(0, record)? {
                outputs.push(out);
            }
        }

        for idx in 0..self.stages.len() {
            let flushed = self.stages[idx].finish()?;
            for record in flushed {
                if let Some(out) = self.push_from(idx + 1, record)? {
                    outputs.push(out);
                }
            }
        }

        debug!(count = outputs.len(), "stream finished");
        Ok(outputs)
    }

    fn push_from(&mut self, start: usize, record: FileRecord) -> Result<Option<FileRecord>> {
        let policy = self.policy;
        let mut current = record;

        for stage in self.stages[start..].iter_mut() {
            match stage.process(current) {
                Ok(Some(next)) => current = next,
                Ok(None) => return Ok(None),
                Err(err) => return policy.on_error(stage.name(), err),
            }
        }

        Ok(Some(current))
    }
}
