// src/watch/mod.rs

//! File watching for `serve`.

pub mod patterns;
pub mod registrar;
pub mod watcher;

pub use patterns::{WatchBinding, build_watch_bindings};
pub use registrar::WatchRegistrar;
pub use watcher::{ChangeEvent, ChangeSender, ChangeSubscription};
