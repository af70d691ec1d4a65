// src/pipeline/mod.rs

//! Task units and their composition.

pub mod compose;
pub mod context;
pub mod registry;
pub mod report;
pub mod task;

pub use compose::{parallel, run_logged, series};
pub use context::{BuildContext, BuildContextBuilder};
pub use registry::TaskRegistry;
pub use report::ReportSink;
pub use task::{Named, Task, TaskFuture, TaskShape, render_tree};
