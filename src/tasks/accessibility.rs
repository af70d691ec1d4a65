// src/tasks/accessibility.rs

use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use tracing::{Span, info, warn};

use crate::errors::{AssetflowError, Result};
use crate::filters::AccessibilityAudit;
use crate::filters::a11y::{Issue, format_report};
use crate::pipeline::{BuildContext, Task, TaskFuture};
use crate::resolve::SourceSet;
use crate::stream::{StageChain, StreamPolicy};
use crate::tasks::asset::read_sources;

/// Audit built pages and emit a report. Findings never fail the task.
pub struct AccessibilityTask {
    sources: Arc<SourceSet>,
}

impl AccessibilityTask {
    pub fn new(sources: SourceSet) -> Self {
        Self {
            sources: Arc::new(sources),
        }
    }
}

fn audit_pages(sources: &SourceSet, ctx: &BuildContext) -> Result<Vec<Issue>> {
    let records = read_sources("accessibilityCheck", sources, ctx)?;
    let pages = records.len();

    let sink = Arc::new(Mutex::new(Vec::new()));
    StageChain::new(StreamPolicy::FailFast)
        .stage(AccessibilityAudit::new(Arc::clone(&sink)))
        .run(records)?;

    let issues = std::mem::take(
        &mut *sink
            .lock()
            .map_err(|_| anyhow!("accessibility sink poisoned"))?,
    );

    let report = format_report(&issues);
    ctx.reports().emit(&report);

    if let Some(path) = &ctx.config().accessibility.report {
        ctx.fs().write(&ctx.resolve(path), report.as_bytes())?;
        info!(report = %path, "wrote accessibility report");
    }

    if issues.is_empty() {
        info!(pages, "no accessibility issues found");
    } else {
        warn!(pages, issues = issues.len(), "accessibility issues found");
    }
    Ok(issues)
}

impl Task for AccessibilityTask {
    fn name(&self) -> &str {
        "accessibilityCheck"
    }

    fn run(&self, ctx: BuildContext) -> TaskFuture {
        let sources = Arc::clone(&self.sources);
        Box::pin(async move {
            let span = Span::current();
            tokio::task::spawn_blocking(move || span.in_scope(|| audit_pages(&sources, &ctx)))
                .await
                .map_err(|e| AssetflowError::Other(anyhow!("accessibilityCheck panicked: {e}")))??;
            Ok(())
        })
    }
}
