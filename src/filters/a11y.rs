// src/filters/a11y.rs

//! Static accessibility audit of built HTML pages.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use scraper::{ElementRef, Html, Selector};

use crate::errors::Result;
use crate::stream::{FileRecord, Stage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub file: String,
    pub check: &'static str,
    pub message: String,
}

fn selector(css: &'static str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css}: {e:?}"))
}

fn has_text(el: &ElementRef<'_>) -> bool {
    el.text().any(|t| !t.trim().is_empty())
}

fn has_label_attr(el: &ElementRef<'_>) -> bool {
    ["aria-label", "aria-labelledby", "title"]
        .iter()
        .any(|a| el.value().attr(a).is_some_and(|v| !v.trim().is_empty()))
}

fn inside_label(el: &ElementRef<'_>) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| a.value().name() == "label")
}

/// Run every check on one document.
pub fn audit(file: &str, html: &str) -> anyhow::Result<Vec<Issue>> {
    let doc = Html::parse_document(html);
    let mut issues = Vec::new();
    let mut push = |check: &'static str, message: String| {
        issues.push(Issue {
            file: file.to_string(),
            check,
            message,
        })
    };

    let lang_ok = doc
        .select(&selector("html")?)
        .next()
        .and_then(|h| h.value().attr("lang"))
        .is_some_and(|l| !l.trim().is_empty());
    if !lang_ok {
        push("html-has-lang", "<html> element must have a lang attribute".into());
    }

    let title_ok = doc.select(&selector("title")?).any(|t| has_text(&t));
    if !title_ok {
        push("document-title", "document must have a non-empty <title>".into());
    }

    for img in doc.select(&selector("img")?) {
        if img.value().attr("alt").is_none() {
            let src = img.value().attr("src").unwrap_or("?");
            push("image-alt", format!("<img src=\"{src}\"> has no alt attribute"));
        }
    }

    let labelled: Vec<String> = doc
        .select(&selector("label[for]")?)
        .filter_map(|l| l.value().attr("for").map(str::to_string))
        .collect();
    for control in doc.select(&selector("input, select, textarea")?) {
        let kind = control.value().attr("type").unwrap_or("text");
        if matches!(kind, "hidden" | "submit" | "button" | "reset" | "image") {
            continue;
        }
        let by_for = control
            .value()
            .id()
            .is_some_and(|id| labelled.iter().any(|l| l == id));
        if !(by_for || inside_label(&control) || has_label_attr(&control)) {
            let name = control.value().attr("name").unwrap_or(control.value().name());
            push("label", format!("form control '{name}' has no label"));
        }
    }

    for button in doc.select(&selector("button")?) {
        if !has_text(&button) && !has_label_attr(&button) {
            push("button-name", "<button> has no discernible text".into());
        }
    }

    for link in doc.select(&selector("a[href]")?) {
        let img_alt = link
            .select(&selector("img[alt]")?)
            .any(|i| i.value().attr("alt").is_some_and(|a| !a.trim().is_empty()));
        if !has_text(&link) && !has_label_attr(&link) && !img_alt {
            let href = link.value().attr("href").unwrap_or("");
            push("link-name", format!("link to \"{href}\" has no discernible text"));
        }
    }

    Ok(issues)
}

pub fn format_report(issues: &[Issue]) -> String {
    let mut out = String::new();
    for issue in issues {
        let _ = writeln!(out, "{}: [{}] {}", issue.file, issue.check, issue.message);
    }
    let _ = writeln!(out, "{} accessibility issue(s)", issues.len());
    out
}

/// Audit every page. Report-only: pages are consumed and nothing fails on
/// findings. The collected issues are handed to `sink` in `finish`.
#[derive(Debug)]
pub struct AccessibilityAudit {
    issues: Vec<Issue>,
    sink: Arc<Mutex<Vec<Issue>>>,
}

impl AccessibilityAudit {
    pub fn new(sink: Arc<Mutex<Vec<Issue>>>) -> Self {
        Self {
            issues: Vec::new(),
            sink,
        }
    }
}

impl Stage for AccessibilityAudit {
    fn name(&self) -> &'static str {
        "accessibility-audit"
    }

    fn process(&mut self, record: FileRecord) -> Result<Option<FileRecord>> {
        let mut found = audit(&record.display_path(), record.text()?)?;
        self.issues.append(&mut found);
        Ok(None)
    }

    fn finish(&mut self) -> Result<Vec<FileRecord>> {
        let mut sink = self
            .sink
            .lock()
            .map_err(|_| anyhow!("accessibility sink poisoned"))?;
        sink.append(&mut self.issues);
        Ok(Vec::new())
    }
}
