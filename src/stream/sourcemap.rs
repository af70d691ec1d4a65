// src/stream/sourcemap.rs

//! Source map bookkeeping.
//!
//! `SourceMapBegin` attaches a v3 map naming the original source (with its
//! content inlined) to each record; transform stages carry it along and
//! merge it when they combine files; `SourceMapWrite` emits the map as a
//! sibling `.map` file and links it from the output.
//!
//! The transform crates do not report positions, so `mappings` stays empty:
//! browsers still list the original sources.

use serde::{Deserialize, Serialize};

use crate::errors::{AssetflowError, Result};
use crate::stream::{FileRecord, Stage};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u8,
    pub file: String,
    pub sources: Vec<String>,
    pub sources_content: Vec<String>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    pub fn for_source(file: impl Into<String>, source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            version: 3,
            file: file.into(),
            sources: vec![source.into()],
            sources_content: vec![content.into()],
            names: Vec::new(),
            mappings: String::new(),
        }
    }

    /// Append another map's sources (used when concatenating).
    pub fn merge(&mut self, other: SourceMap) {
        for (source, content) in other.sources.into_iter().zip(other.sources_content) {
            if !self.sources.contains(&source) {
                self.sources.push(source);
                self.sources_content.push(content);
            }
        }
    }
}

/// Attach an initial map to every record.
#[derive(Debug, Default)]
pub struct SourceMapBegin;

impl Stage for SourceMapBegin {
    fn name(&self) -> &'static str {
        "sourcemap-init"
    }

    fn process(&mut self, mut record: FileRecord) -> Result<Option<FileRecord>> {
        let content = record.text()?.to_string();
        let source = record.relative_slash();
        record.source_map = Some(SourceMap::for_source(record.file_name(), source, content));
        Ok(Some(record))
    }
}

/// Write each record's map next to it as `<file>.map` and append the
/// `sourceMappingURL` comment.
#[derive(Debug, Default)]
pub struct SourceMapWrite {
    pending: Vec<FileRecord>,
}

impl SourceMapWrite {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stage for SourceMapWrite {
    fn name(&self) -> &'static str {
        "sourcemap-write"
    }

    fn process(&mut self, mut record: FileRecord) -> Result<Option<FileRecord>> {
        let Some(mut map) = record.source_map.take() else {
            return Ok(Some(record));
        };

        let file_name = record.file_name();
        map.file = file_name.clone();
        let map_name = format!("{file_name}.map");

        let comment = match record.extension() {
            Some("css") => format!("\n/*# sourceMappingURL={map_name} */\n"),
            _ => format!("\n//# sourceMappingURL={map_name}\n"),
        };
        while record.contents.last() == Some(&b'\n') {
            record.contents.pop();
        }
        record.contents.extend_from_slice(comment.as_bytes());

        let json = serde_json::to_vec(&map).map_err(|e| {
            AssetflowError::transform(record.display_path(), format!("serializing source map: {e}"))
        })?;
        let mut map_path = record.relative.clone();
        map_path.set_file_name(&map_name);
        self.pending.push(FileRecord::new(map_path, json));

        Ok(Some(record))
    }

    fn finish(&mut self) -> Result<Vec<FileRecord>> {
        Ok(std::mem::take(&mut self.pending))
    }
}
