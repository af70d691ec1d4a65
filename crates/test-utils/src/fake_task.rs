use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use assetflow::errors::AssetflowError;
use assetflow::pipeline::{BuildContext, Task, TaskFuture};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    Started(String),
    Finished(String),
    Failed(String),
}

pub type TaskLog = Arc<Mutex<Vec<TaskEvent>>>;

pub fn new_log() -> TaskLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Names of the tasks that started, in order.
pub fn started(log: &TaskLog) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            TaskEvent::Started(n) => Some(n.clone()),
            _ => None,
        })
        .collect()
}

pub fn events(log: &TaskLog) -> Vec<TaskEvent> {
    log.lock().unwrap().clone()
}

/// A task that:
/// - records when it starts and how it ends
/// - optionally sleeps before finishing
/// - succeeds or fails with `Other("<name> failed")`.
pub struct RecordingTask {
    name: String,
    delay: Duration,
    fail: bool,
    log: TaskLog,
}

impl RecordingTask {
    pub fn ok(name: &str, log: &TaskLog) -> Self {
        Self {
            name: name.to_string(),
            delay: Duration::ZERO,
            fail: false,
            log: Arc::clone(log),
        }
    }

    pub fn failing(name: &str, log: &TaskLog) -> Self {
        Self {
            fail: true,
            ..Self::ok(name, log)
        }
    }

    pub fn with_delay(mut self, millis: u64) -> Self {
        self.delay = Duration::from_millis(millis);
        self
    }

    pub fn arc(self) -> Arc<dyn Task> {
        Arc::new(self)
    }
}

impl Task for RecordingTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, _ctx: BuildContext) -> TaskFuture {
        let name = self.name.clone();
        let delay = self.delay;
        let fail = self.fail;
        let log = Arc::clone(&self.log);

        Box::pin(async move {
            log.lock().unwrap().push(TaskEvent::Started(name.clone()));
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if fail {
                log.lock().unwrap().push(TaskEvent::Failed(name.clone()));
                return Err(AssetflowError::Other(anyhow!("{name} failed")));
            }
            log.lock().unwrap().push(TaskEvent::Finished(name));
            Ok(())
        })
    }
}
