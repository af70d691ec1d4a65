// src/pipeline/compose.rs

//! `series` and `parallel` combinators.
//!
//! Both propagate the first failure unchanged. A parallel group does not
//! cancel its remaining members on failure: they are detached and run to
//! completion, and their outcomes are ignored.

use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use tokio::task::JoinSet;
use tracing::{Instrument, error, info, info_span};

use crate::errors::{AssetflowError, Result};
use crate::pipeline::{BuildContext, Task, TaskFuture, TaskShape};

pub const SERIES_NAME: &str = "<series>";
pub const PARALLEL_NAME: &str = "<parallel>";

pub struct Series {
    tasks: Vec<Arc<dyn Task>>,
}

pub struct Parallel {
    tasks: Vec<Arc<dyn Task>>,
}

/// Run `tasks` one after another, stopping at the first failure.
pub fn series(tasks: Vec<Arc<dyn Task>>) -> Arc<dyn Task> {
    Arc::new(Series { tasks })
}

/// Run `tasks` concurrently; fail as soon as any of them fails.
pub fn parallel(tasks: Vec<Arc<dyn Task>>) -> Arc<dyn Task> {
    Arc::new(Parallel { tasks })
}

impl Task for Series {
    fn name(&self) -> &str {
        SERIES_NAME
    }

    fn run(&self, ctx: BuildContext) -> TaskFuture {
        let tasks = self.tasks.clone();
        Box::pin(async move {
            for task in tasks {
                run_logged(task, ctx.clone()).await?;
            }
            Ok(())
        })
    }

    fn shape(&self) -> TaskShape {
        TaskShape::Series(self.tasks.clone())
    }
}

impl Task for Parallel {
    fn name(&self) -> &str {
        PARALLEL_NAME
    }

    fn run(&self, ctx: BuildContext) -> TaskFuture {
        let tasks = self.tasks.clone();
        Box::pin(async move {
            let mut set = JoinSet::new();
            for task in tasks {
                set.spawn(run_logged(task, ctx.clone()));
            }

            while let Some(joined) = set.join_next().await {
                let outcome = joined.unwrap_or_else(|e| {
                    Err(AssetflowError::Other(anyhow!("parallel member panicked: {e}")))
                });
                if let Err(err) = outcome {
                    // Leave the rest running; nobody waits for them.
                    set.detach_all();
                    return Err(err);
                }
            }
            Ok(())
        })
    }

    fn shape(&self) -> TaskShape {
        TaskShape::Parallel(self.tasks.clone())
    }
}

/// Run a task with start/finish/error logging and timing.
///
/// Everything the task logs is nested in a `task{name=..}` span.
pub async fn run_logged(task: Arc<dyn Task>, ctx: BuildContext) -> Result<()> {
    let name = task.name().to_string();
    let span = info_span!("task", name = %name);

    async move {
        let started = Instant::now();
        info!("Starting '{name}'...");

        let result = task.run(ctx).await;
        let elapsed = started.elapsed();

        match &result {
            Ok(()) => info!("Finished '{name}' after {elapsed:.2?}"),
            Err(err) => error!(error = %err, "'{name}' errored after {elapsed:.2?}"),
        }
        result
    }
    .instrument(span)
    .await
}
