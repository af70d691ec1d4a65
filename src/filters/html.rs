// src/filters/html.rs

use minify_html::Cfg;

use crate::errors::Result;
use crate::stream::{FileRecord, Stage};

/// Collapse whitespace in HTML while keeping comments.
///
/// Closing tags and the `<html>`/`<head>` openers are kept so the preview
/// server can still find `</body>` when injecting its client.
pub struct MinifyHtml {
    cfg: Cfg,
}

// `Cfg` has no `Debug` impl.
impl std::fmt::Debug for MinifyHtml {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MinifyHtml")
            .field("keep_comments", &self.cfg.keep_comments)
            .finish_non_exhaustive()
    }
}

impl Default for MinifyHtml {
    fn default() -> Self {
        let mut cfg = Cfg::new();
        cfg.keep_comments = true;
        cfg.keep_closing_tags = true;
        cfg.keep_html_and_head_opening_tags = true;
        cfg.minify_css = false;
        cfg.minify_js = false;
        Self { cfg }
    }
}

impl Stage for MinifyHtml {
    fn name(&self) -> &'static str {
        "minify-html"
    }

    fn process(&mut self, mut record: FileRecord) -> Result<Option<FileRecord>> {
        record.contents = minify_html::minify(&record.contents, &self.cfg);
        Ok(Some(record))
    }
}
