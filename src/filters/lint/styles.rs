// src/filters/lint/styles.rs

//! Line-based style sheet rules.

use anyhow::Context;
use regex::{Captures, Regex};

use crate::types::Severity;

pub(super) struct PatternRule {
    pub id: &'static str,
    pub severity: Severity,
    regex: Regex,
    message: &'static str,
    /// Extra check on a match; `None` means every match is a violation.
    confirm: Option<fn(&Captures<'_>) -> bool>,
}

/// A rule match: 1-based line and column.
#[derive(Debug)]
pub(super) struct LineHit {
    pub rule: &'static str,
    pub severity: Severity,
    pub line: usize,
    pub column: usize,
    pub message: &'static str,
}

fn rule(
    id: &'static str,
    severity: Severity,
    pattern: &str,
    message: &'static str,
) -> anyhow::Result<PatternRule> {
    Ok(PatternRule {
        id,
        severity,
        regex: Regex::new(pattern).with_context(|| format!("compiling lint rule {id}"))?,
        message,
        confirm: None,
    })
}

fn is_invalid_hex(caps: &Captures<'_>) -> bool {
    let Some(color) = caps.name("at") else {
        return false;
    };
    let digits = &color.as_str()[1..];
    !(matches!(digits.len(), 3 | 4 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit()))
}

pub(super) fn default_rules() -> anyhow::Result<Vec<PatternRule>> {
    let mut hex = rule(
        "color-no-invalid-hex",
        Severity::Error,
        r"^\s*[-\w]+\s*:[^{]*?(?P<at>#[0-9A-Za-z]+)[^{]*$",
        "Unexpected invalid hex color",
    )?;
    hex.confirm = Some(is_invalid_hex);

    Ok(vec![
        rule(
            "declaration-no-important",
            Severity::Warn,
            r"!important",
            "Unexpected !important",
        )?,
        hex,
        rule("block-no-empty", Severity::Warn, r"\{\s*\}", "Unexpected empty block")?,
    ])
}

pub(super) fn check(source: &str, rules: &[PatternRule]) -> Vec<LineHit> {
    let mut hits = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*') {
            continue;
        }
        for r in rules {
            let Some(caps) = r.regex.captures(line) else {
                continue;
            };
            if r.confirm.is_some_and(|check| !check(&caps)) {
                continue;
            }
            let Some(at) = caps.name("at").or_else(|| caps.get(0)) else {
                continue;
            };
            hits.push(LineHit {
                rule: r.id,
                severity: r.severity,
                line: idx + 1,
                column: at.start() + 1,
                message: r.message,
            });
        }
    }
    hits
}
