// src/watch/registrar.rs

//! Dispatch change events to watch bindings.
//!
//! Each binding owns a FIFO queue drained by its own worker, so a slow
//! pipeline only delays later runs of the same binding. Every matching event
//! enqueues one run; there is no debouncing, coalescing or cancellation.

use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::pipeline::{BuildContext, run_logged};
use crate::resolve::relative_str;
use crate::watch::{ChangeSubscription, WatchBinding};

/// Running dispatcher plus one worker per binding.
#[derive(Debug)]
pub struct WatchRegistrar {
    dispatcher: JoinHandle<()>,
    workers: Vec<JoinHandle<()>>,
}

impl WatchRegistrar {
    pub fn spawn(
        ctx: BuildContext,
        bindings: Vec<WatchBinding>,
        mut subscription: ChangeSubscription,
    ) -> Self {
        let mut queues = Vec::with_capacity(bindings.len());
        let mut workers = Vec::with_capacity(bindings.len());

        for binding in bindings {
            let (tx, rx) = mpsc::unbounded_channel::<Vec<String>>();
            workers.push(tokio::spawn(binding_worker(ctx.clone(), binding.clone(), rx)));
            queues.push((binding, tx));
        }

        let root = ctx.root().to_path_buf();
        let dispatcher = tokio::spawn(async move {
            while let Some(event) = subscription.next().await {
                let rel_paths = relative_paths(&root, &event.paths);
                for (binding, tx) in &queues {
                    let hits: Vec<String> = rel_paths
                        .iter()
                        .filter(|p| binding.matches(p))
                        .cloned()
                        .collect();
                    if hits.is_empty() {
                        continue;
                    }
                    if tx.send(hits).is_err() {
                        warn!(binding = %binding.label(), "watch worker gone; dropping change");
                    }
                }
            }
            debug!("change subscription closed; dispatcher exiting");
        });

        Self {
            dispatcher,
            workers,
        }
    }

    /// Wait for the subscription to close and every queued run to finish.
    pub async fn join(self) {
        let _ = self.dispatcher.await;
        for worker in self.workers {
            let _ = worker.await;
        }
    }

    pub fn abort(&self) {
        self.dispatcher.abort();
        for worker in &self.workers {
            worker.abort();
        }
    }
}

fn relative_paths(root: &std::path::Path, paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .filter_map(|p| {
            if p.is_relative() {
                Some(crate::resolve::to_slash(p))
            } else {
                relative_str(root, p)
            }
        })
        .collect()
}

async fn binding_worker(
    ctx: BuildContext,
    binding: WatchBinding,
    mut rx: mpsc::UnboundedReceiver<Vec<String>>,
) {
    while let Some(paths) = rx.recv().await {
        info!(binding = %binding.label(), ?paths, "change detected");
        // Failures are already logged by `run_logged`; the binding stays armed.
        let _ = run_logged(binding.pipeline(), ctx.clone()).await;
    }
}
