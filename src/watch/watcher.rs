// src/watch/watcher.rs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// One batch of changed paths as reported by the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub paths: Vec<PathBuf>,
}

/// Async stream of filesystem changes.
///
/// Dropping the subscription stops the underlying watcher.
pub struct ChangeSubscription {
    rx: mpsc::UnboundedReceiver<ChangeEvent>,
    _watcher: Option<RecommendedWatcher>,
}

impl std::fmt::Debug for ChangeSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeSubscription")
            .field("os_watcher", &self._watcher.is_some())
            .finish()
    }
}

/// Feeds events into a subscription created with
/// [`ChangeSubscription::manual`].
#[derive(Debug, Clone)]
pub struct ChangeSender {
    tx: mpsc::UnboundedSender<ChangeEvent>,
}

impl ChangeSender {
    /// Returns `false` once the subscription has been dropped.
    pub fn send<I, P>(&self, paths: I) -> bool
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let paths = paths.into_iter().map(Into::into).collect();
        self.tx.send(ChangeEvent { paths }).is_ok()
    }
}

impl ChangeSubscription {
    /// Watch `root` recursively.
    pub fn watch(root: &Path) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel::<ChangeEvent>();

        // Called synchronously by notify on its own thread.
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if matches!(event.kind, EventKind::Access(_)) || event.paths.is_empty() {
                        return;
                    }
                    if let Err(err) = tx.send(ChangeEvent { paths: event.paths }) {
                        // We can't log via tracing here easily, so fallback to stderr.
                        eprintln!("assetflow: failed to forward notify event: {err}");
                    }
                }
                Err(err) => {
                    eprintln!("assetflow: file watch error: {err}");
                }
            },
            Config::default(),
        )
        .context("creating file watcher")?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .with_context(|| format!("watching {:?}", root))?;

        info!("file watcher started on {:?}", root);

        Ok(Self {
            rx,
            _watcher: Some(watcher),
        })
    }

    /// A subscription fed by hand instead of by the OS.
    pub fn manual() -> (ChangeSender, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            ChangeSender { tx },
            Self { rx, _watcher: None },
        )
    }

    /// Next change, or `None` once the source is gone.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        let event = self.rx.recv().await;
        if let Some(ev) = &event {
            debug!(paths = ?ev.paths, "change event");
        }
        event
    }
}
