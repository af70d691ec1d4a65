// src/pipeline/task.rs

use std::fmt::Write as _;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::errors::Result;
use crate::pipeline::BuildContext;

/// Future returned by [`Task::run`].
///
/// Owned and `Send` so runs can be spawned onto the runtime (parallel groups,
/// watch workers).
pub type TaskFuture = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

/// How a task is composed; used for `--dry-run` output.
pub enum TaskShape {
    Leaf,
    Series(Vec<Arc<dyn Task>>),
    Parallel(Vec<Arc<dyn Task>>),
}

/// A named unit of work: an asset task, a command, or a composed pipeline.
///
/// Tasks are built once at startup and may be run any number of times.
pub trait Task: Send + Sync {
    fn name(&self) -> &str;

    fn run(&self, ctx: BuildContext) -> TaskFuture;

    fn shape(&self) -> TaskShape {
        TaskShape::Leaf
    }
}

/// A registered alias for another task, e.g. `build` for its series.
pub struct Named {
    name: String,
    inner: Arc<dyn Task>,
}

impl Named {
    pub fn new(name: impl Into<String>, inner: Arc<dyn Task>) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }
}

impl Task for Named {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: BuildContext) -> TaskFuture {
        self.inner.run(ctx)
    }

    fn shape(&self) -> TaskShape {
        self.inner.shape()
    }
}

/// Render a task's composition as an indented tree.
pub fn render_tree(task: &dyn Task) -> String {
    let mut out = String::new();
    render_into(task, 0, &mut out);
    out
}

fn render_into(task: &dyn Task, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let (label, children) = match task.shape() {
        TaskShape::Leaf => (None, Vec::new()),
        TaskShape::Series(c) => (Some("series"), c),
        TaskShape::Parallel(c) => (Some("parallel"), c),
    };
    let _ = match label {
        Some(kind) if task.name().starts_with('<') => writeln!(out, "{indent}{kind}"),
        Some(kind) => writeln!(out, "{indent}{} ({kind})", task.name()),
        None => writeln!(out, "{indent}{}", task.name()),
    };
    for child in children {
        render_into(child.as_ref(), depth + 1, out);
    }
}
