// src/filters/scripts.rs

use std::path::PathBuf;

use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::errors::{AssetflowError, Result};
use crate::stream::{FileRecord, SourceMap, Stage};

/// Parse `source` and return the first syntax error, if any.
pub fn syntax_error(source: &str) -> Option<String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::default()).parse();
    ret.errors.first().map(|e| e.to_string())
}

/// Concatenate every record, in stream order, into one bundle.
///
/// Nothing is emitted until [`Stage::finish`]; an empty input produces no
/// bundle at all.
#[derive(Debug)]
pub struct Concat {
    bundle: PathBuf,
    parts: Vec<FileRecord>,
}

impl Concat {
    pub fn new(bundle: impl Into<PathBuf>) -> Self {
        Self {
            bundle: bundle.into(),
            parts: Vec::new(),
        }
    }
}

impl Stage for Concat {
    fn name(&self) -> &'static str {
        "concat"
    }

    fn process(&mut self, record: FileRecord) -> Result<Option<FileRecord>> {
        self.parts.push(record);
        Ok(None)
    }

    fn finish(&mut self) -> Result<Vec<FileRecord>> {
        if self.parts.is_empty() {
            return Ok(Vec::new());
        }

        let mut contents = Vec::new();
        let mut map: Option<SourceMap> = None;

        for part in self.parts.drain(..) {
            if !contents.is_empty() {
                contents.push(b'\n');
            }
            contents.extend_from_slice(&part.contents);

            if let Some(part_map) = part.source_map {
                match map.as_mut() {
                    Some(m) => m.merge(part_map),
                    None => map = Some(part_map),
                }
            }
        }

        let mut bundle = FileRecord::new(self.bundle.clone(), contents);
        bundle.source_map = map;
        Ok(vec![bundle])
    }
}

/// Minify JavaScript.
///
/// `minifier` does not validate its input, so the source is parsed first and
/// a syntax error is reported as a transform failure instead of producing a
/// mangled bundle.
#[derive(Debug, Default)]
pub struct MinifyJs;

impl Stage for MinifyJs {
    fn name(&self) -> &'static str {
        "minify-js"
    }

    fn process(&mut self, mut record: FileRecord) -> Result<Option<FileRecord>> {
        let source = record.text()?;
        if let Some(message) = syntax_error(source) {
            return Err(AssetflowError::transform(record.display_path(), message));
        }

        let minified = minifier::js::minify(source).to_string();
        record.contents = minified.into_bytes();
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_joins_in_order_and_merges_maps() {
        let mut stage = Concat::new("main.js");
        for (name, body) in [("a.js", "var a = 1;"), ("b.js", "var b = 2;")] {
            let mut rec = FileRecord::new(name, body);
            rec.source_map = Some(SourceMap::for_source(name, name, body));
            assert!(stage.process(rec).unwrap().is_none());
        }

        let out = stage.finish().unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].relative, PathBuf::from("main.js"));
        assert_eq!(out[0].text().unwrap(), "var a = 1;\nvar b = 2;");
        let map = out[0].source_map.as_ref().unwrap();
        assert_eq!(map.sources, vec!["a.js", "b.js"]);
    }

    #[test]
    fn concat_without_inputs_emits_nothing() {
        let mut stage = Concat::new("main.js");
        assert!(stage.finish().unwrap().is_empty());
    }

    #[test]
    fn minify_shrinks_valid_code() {
        let src = "function add(a, b) {\n    // sum\n    return a + b;\n}\n";
        let out = MinifyJs
            .process(FileRecord::new("main.js", src))
            .unwrap()
            .unwrap();
        assert!(out.contents.len() < src.len());
        assert!(!out.text().unwrap().contains("// sum"));
    }

    #[test]
    fn minify_rejects_syntax_errors() {
        let err = MinifyJs
            .process(FileRecord::new("main.js", "function ( {"))
            .unwrap_err();
        assert!(matches!(err, AssetflowError::TransformFailed { .. }));
    }
}
