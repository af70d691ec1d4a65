// src/filters/lint/mod.rs

//! Lint rules for scripts and style sheets.
//!
//! Every rule has an id and a default severity; `[lint.rules]` can raise,
//! lower or switch off any of them. A `parse-error` finding comes from the
//! same parsers the build uses (oxc for scripts, grass for styles).

mod scripts;
mod styles;

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::config::LintSection;
use crate::errors::{AssetflowError, Result};
use crate::filters::styles::{CompileScss, is_partial};
use crate::pipeline::ReportSink;
use crate::stream::{FileRecord, Stage};
use crate::types::{CssOutputStyle, Severity};

use scripts::ScriptRule;
use styles::PatternRule;

pub const PARSE_ERROR: &str = "parse-error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub file: String,
    /// 1-based; `0` when the parser did not give a position.
    pub line: usize,
    pub column: usize,
    pub rule: String,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintTarget {
    Scripts,
    Styles,
}

enum Rules {
    Scripts(Vec<ScriptRule>),
    Styles(Vec<PatternRule>),
}

/// Compiled rule set for one target.
pub struct Linter {
    root: PathBuf,
    parse_severity: Severity,
    rules: Rules,
}

impl std::fmt::Debug for Linter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (target, ids): (_, Vec<_>) = match &self.rules {
            Rules::Scripts(rules) => (LintTarget::Scripts, rules.iter().map(|r| r.id).collect()),
            Rules::Styles(rules) => (LintTarget::Styles, rules.iter().map(|r| r.id).collect()),
        };
        f.debug_struct("Linter")
            .field("target", &target)
            .field("rules", &ids)
            .finish()
    }
}

/// Apply `[lint.rules]` and drop everything switched off.
fn configure<R>(
    rules: Vec<R>,
    overrides: &BTreeMap<String, Severity>,
    slot: fn(&mut R) -> (&'static str, &mut Severity),
) -> Vec<R> {
    rules
        .into_iter()
        .filter_map(|mut r| {
            let (id, severity) = slot(&mut r);
            if let Some(sev) = overrides.get(id) {
                *severity = *sev;
            }
            (*severity != Severity::Off).then_some(r)
        })
        .collect()
}

impl Linter {
    pub fn new(target: LintTarget, config: &LintSection) -> Result<Self> {
        let overrides = &config.rules;
        let rules = match target {
            LintTarget::Scripts => Rules::Scripts(configure(
                scripts::default_rules(),
                overrides,
                |r| (r.id, &mut r.severity),
            )),
            LintTarget::Styles => Rules::Styles(configure(
                styles::default_rules()?,
                overrides,
                |r| (r.id, &mut r.severity),
            )),
        };

        Ok(Self {
            root: PathBuf::new(),
            parse_severity: overrides.get(PARSE_ERROR).copied().unwrap_or(Severity::Error),
            rules,
        })
    }

    /// Directory that record origins are relative to; used to resolve
    /// style imports.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn lint(&self, record: &FileRecord) -> Result<Vec<Finding>> {
        let file = record.display_path();
        let source = record.text()?;

        let (parse_error, mut findings) = match &self.rules {
            Rules::Scripts(rules) => {
                let (syntax, hits) = scripts::check(source, rules);
                let findings = hits
                    .into_iter()
                    .map(|hit| {
                        let (line, column) = line_col(source, hit.offset);
                        Finding {
                            file: file.clone(),
                            line,
                            column,
                            rule: hit.rule.to_string(),
                            severity: hit.severity,
                            message: hit.message,
                        }
                    })
                    .collect::<Vec<_>>();
                (syntax, findings)
            }
            Rules::Styles(rules) => {
                let findings = styles::check(source, rules)
                    .into_iter()
                    .map(|hit| Finding {
                        file: file.clone(),
                        line: hit.line,
                        column: hit.column,
                        rule: hit.rule.to_string(),
                        severity: hit.severity,
                        message: hit.message.to_string(),
                    })
                    .collect::<Vec<_>>();
                let compile = if self.parse_severity == Severity::Off {
                    None
                } else {
                    self.style_error(record)
                };
                (compile, findings)
            }
        };

        if self.parse_severity != Severity::Off {
            if let Some(message) = parse_error {
                findings.insert(
                    0,
                    Finding {
                        file,
                        line: 0,
                        column: 0,
                        rule: PARSE_ERROR.to_string(),
                        severity: self.parse_severity,
                        message,
                    },
                );
            }
        }

        Ok(findings)
    }

    fn style_error(&self, record: &FileRecord) -> Option<String> {
        if is_partial(&record.relative) {
            return None;
        }
        CompileScss::new(CssOutputStyle::Expanded)
            .with_root(&self.root)
            .process(record.clone())
            .err()
            .map(|e| match e {
                AssetflowError::TransformFailed { message, .. } => message,
                other => other.to_string(),
            })
    }
}

/// 1-based line and column (in characters) of a byte offset.
fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let before = source.get(..offset).unwrap_or(source);
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let line = before.matches('\n').count() + 1;
    (line, before[line_start..].chars().count() + 1)
}

/// Render findings grouped by file, ending with a summary line.
pub fn format_report(findings: &[Finding]) -> String {
    let mut by_file: BTreeMap<&str, Vec<&Finding>> = BTreeMap::new();
    for f in findings {
        by_file.entry(f.file.as_str()).or_default().push(f);
    }

    let mut out = String::new();
    for (file, items) in by_file {
        let _ = writeln!(out, "{file}");
        for f in items {
            let _ = writeln!(
                out,
                "  {:>7}  {:<7}  {}  {}",
                format!("{}:{}", f.line, f.column),
                f.severity.to_string(),
                f.message,
                f.rule
            );
        }
        out.push('\n');
    }

    let (errors, warnings) = count(findings);
    let _ = writeln!(
        out,
        "{} problem(s) ({} error(s), {} warning(s))",
        findings.len(),
        errors,
        warnings
    );
    out
}

fn count(findings: &[Finding]) -> (usize, usize) {
    let errors = findings.iter().filter(|f| f.severity == Severity::Error).count();
    (errors, findings.len() - errors)
}

/// Collects findings for every record and reports once all inputs are seen.
///
/// Records are consumed; a lint task writes nothing.
#[derive(Debug)]
pub struct LintStage {
    task: String,
    linter: Linter,
    fail_on: Severity,
    reports: ReportSink,
    findings: Vec<Finding>,
}

impl LintStage {
    pub fn new(task: impl Into<String>, linter: Linter, fail_on: Severity) -> Self {
        Self {
            task: task.into(),
            linter,
            fail_on,
            reports: ReportSink::stdout(),
            findings: Vec::new(),
        }
    }

    pub fn with_reports(mut self, sink: ReportSink) -> Self {
        self.reports = sink;
        self
    }
}

impl Stage for LintStage {
    fn name(&self) -> &'static str {
        "lint"
    }

    fn process(&mut self, record: FileRecord) -> Result<Option<FileRecord>> {
        let mut found = self.linter.lint(&record)?;
        self.findings.append(&mut found);
        Ok(None)
    }

    fn finish(&mut self) -> Result<Vec<FileRecord>> {
        if self.findings.is_empty() {
            return Ok(Vec::new());
        }

        self.reports.emit(&format_report(&self.findings));

        let failing = self.fail_on != Severity::Off
            && self.findings.iter().any(|f| f.severity >= self.fail_on);
        if failing {
            let (errors, warnings) = count(&self.findings);
            return Err(AssetflowError::LintFailed {
                task: self.task.clone(),
                errors,
                warnings,
            });
        }
        Ok(Vec::new())
    }
}
