// src/server/mod.rs

//! Live-reload notifier and the preview server that delivers it.

pub mod http;
pub mod notifier;

pub use http::{PreviewServer, inject_client, router, start};
pub use notifier::{LiveReload, ReloadMessage};
