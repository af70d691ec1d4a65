// src/filters/svg.rs

use crate::errors::{AssetflowError, Result};
use crate::stream::{FileRecord, Stage};

/// Re-serialize SVG through `usvg`, which drops editor metadata, comments
/// and unused definitions and writes the tree without indentation.
#[derive(Debug, Default)]
pub struct MinifySvg;

impl MinifySvg {
    fn write_options() -> usvg::WriteOptions {
        usvg::WriteOptions {
            preserve_text: true,
            indent: xmlwriter::Indent::None,
            attributes_indent: xmlwriter::Indent::None,
            ..usvg::WriteOptions::default()
        }
    }
}

impl Stage for MinifySvg {
    fn name(&self) -> &'static str {
        "minify-svg"
    }

    fn process(&mut self, mut record: FileRecord) -> Result<Option<FileRecord>> {
        let tree = usvg::Tree::from_data(&record.contents, &usvg::Options::default())
            .map_err(|e| AssetflowError::transform(record.display_path(), e.to_string()))?;

        record.contents = tree.to_string(&Self::write_options()).into_bytes();
        Ok(Some(record))
    }
}
