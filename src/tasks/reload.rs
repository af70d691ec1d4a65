// src/tasks/reload.rs

use tracing::debug;

use crate::pipeline::{BuildContext, Task, TaskFuture};

/// Ask every preview client for a full page reload.
#[derive(Debug, Default)]
pub struct ReloadTask;

impl Task for ReloadTask {
    fn name(&self) -> &str {
        "reload"
    }

    fn run(&self, ctx: BuildContext) -> TaskFuture {
        Box::pin(async move {
            let clients = ctx.notifier().reload();
            debug!(clients, "reload sent");
            Ok(())
        })
    }
}
