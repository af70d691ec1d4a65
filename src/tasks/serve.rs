// src/tasks/serve.rs

use anyhow::Context;
use tracing::info;

use crate::pipeline::{BuildContext, Task, TaskFuture};
use crate::server;
use crate::watch::{ChangeSubscription, WatchRegistrar, build_watch_bindings};

/// Start the preview server and the watch bindings, then block until
/// Ctrl-C.
#[derive(Debug, Default)]
pub struct ServeTask;

impl Task for ServeTask {
    fn name(&self) -> &str {
        "serve"
    }

    fn run(&self, ctx: BuildContext) -> TaskFuture {
        Box::pin(async move {
            let preview = server::start(
                &ctx.config().server,
                ctx.output_root(),
                ctx.notifier().clone(),
            )
            .await?;
            println!("Serving {} at {}", ctx.config().output.root, preview.url());

            let bindings = build_watch_bindings(&ctx.config().watch, ctx.registry())?;
            info!(bindings = bindings.len(), "watch bindings registered");
            let subscription = ChangeSubscription::watch(ctx.root())?;
            let registrar = WatchRegistrar::spawn(ctx.clone(), bindings, subscription);

            tokio::signal::ctrl_c()
                .await
                .context("waiting for Ctrl-C")?;
            info!("Ctrl-C received; shutting down");

            registrar.abort();
            preview.shutdown();
            Ok(())
        })
    }
}
