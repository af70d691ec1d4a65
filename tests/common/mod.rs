#![allow(dead_code)]

use std::sync::Arc;

use assetflow::cache::ImageCache;
use assetflow::config::ConfigFile;
use assetflow::fs::mock::MockFileSystem;
use assetflow::pipeline::BuildContext;

pub use assetflow_test_utils::builders::ConfigFileBuilder;
pub use assetflow_test_utils::fake_task::{
    RecordingTask, TaskEvent, TaskLog, events, new_log, started,
};
pub use assetflow_test_utils::fixture::TempProject;
pub use assetflow_test_utils::{init_tracing, with_timeout};

/// Context for tests that never touch the disk.
pub fn mock_context() -> BuildContext {
    BuildContext::builder("/project", ConfigFile::default())
        .fs(Arc::new(MockFileSystem::new()))
        .image_cache(Arc::new(ImageCache::in_memory()))
        .build()
}
