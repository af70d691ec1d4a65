// src/pipeline/registry.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::{AssetflowError, Result};
use crate::pipeline::task::Named;
use crate::pipeline::Task;

/// Name → task table, built once at startup.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<String, Arc<dyn Task>>,
}

impl std::fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.tasks.keys()).finish()
    }
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `task` under `name`. Composed pipelines are wrapped so they
    /// log and display under the registered name.
    pub fn register(&mut self, name: impl Into<String>, task: Arc<dyn Task>) -> Result<()> {
        let name = name.into();
        if self.tasks.contains_key(&name) {
            return Err(AssetflowError::ConfigError(format!(
                "task '{name}' is registered twice"
            )));
        }

        let task = if task.name() == name {
            task
        } else {
            Arc::new(Named::new(name.clone(), task)) as Arc<dyn Task>
        };
        self.tasks.insert(name, task);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Task>> {
        self.tasks
            .get(name)
            .cloned()
            .ok_or_else(|| AssetflowError::TaskNotFound(name.to_string()))
    }

    pub fn get_all<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Arc<dyn Task>>> {
        names.iter().map(|n| self.get(n.as_ref())).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
