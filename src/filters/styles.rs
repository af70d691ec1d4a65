// src/filters/styles.rs

use std::path::{Path, PathBuf};

use crate::errors::{AssetflowError, Result};
use crate::stream::{FileRecord, Stage};
use crate::types::CssOutputStyle;

/// Compile SCSS to CSS with `grass`.
///
/// Partials (`_name.scss`) are dropped from the stream; they are only
/// reachable through `@use`/`@import` from another sheet. Imports resolve
/// relative to the importing file's directory.
#[derive(Debug, Clone)]
pub struct CompileScss {
    style: CssOutputStyle,
    root: PathBuf,
}

impl CompileScss {
    pub fn new(style: CssOutputStyle) -> Self {
        Self {
            style,
            root: PathBuf::new(),
        }
    }

    /// Directory that record origins are relative to.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    fn options(&self, origin: Option<&Path>) -> grass::Options<'static> {
        let style = match self.style {
            CssOutputStyle::Expanded => grass::OutputStyle::Expanded,
            CssOutputStyle::Compressed => grass::OutputStyle::Compressed,
        };
        let mut options = grass::Options::default().style(style);
        if let Some(dir) = origin.and_then(Path::parent) {
            options = options.load_path(self.root.join(dir));
        }
        options
    }
}

/// `_name.scss`.
pub fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}

impl Stage for CompileScss {
    fn name(&self) -> &'static str {
        "compile-scss"
    }

    fn process(&mut self, mut record: FileRecord) -> Result<Option<FileRecord>> {
        if is_partial(&record.relative) {
            return Ok(None);
        }

        let options = self.options(record.origin.as_deref());
        let css = grass::from_string(record.text()?.to_string(), &options)
            .map_err(|e| AssetflowError::transform(record.display_path(), e.to_string()))?;

        record.contents = css.into_bytes();
        record.set_extension("css");
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scss(name: &str, body: &str) -> FileRecord {
        FileRecord::new(name, body.as_bytes().to_vec())
    }

    #[test]
    fn compiles_nested_rules() {
        let mut stage = CompileScss::new(CssOutputStyle::Compressed);
        let out = stage
            .process(scss("main.scss", "$c: red; .a { .b { color: $c; } }"))
            .unwrap()
            .unwrap();
        assert_eq!(out.relative, PathBuf::from("main.css"));
        assert_eq!(out.text().unwrap().trim(), ".a .b{color:red}");
    }

    #[test]
    fn partials_are_dropped() {
        let mut stage = CompileScss::new(CssOutputStyle::Expanded);
        let out = stage.process(scss("_vars.scss", "$c: red;")).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn syntax_error_is_a_transform_failure() {
        let mut stage = CompileScss::new(CssOutputStyle::Expanded);
        let err = stage.process(scss("bad.scss", ".a { color: ")).unwrap_err();
        assert!(matches!(err, AssetflowError::TransformFailed { ref file, .. } if file == "bad.scss"));
    }
}
