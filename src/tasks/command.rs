// src/tasks/command.rs

//! `[command.<name>]` tasks: a shell command run in the project root.

use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{AssetflowError, Result};
use crate::pipeline::{BuildContext, Task, TaskFuture};

#[derive(Debug, Clone)]
pub struct CommandTask {
    name: String,
    cmd: String,
}

impl CommandTask {
    pub fn new(name: impl Into<String>, cmd: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cmd: cmd.into(),
        }
    }
}

impl Task for CommandTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: BuildContext) -> TaskFuture {
        let name = self.name.clone();
        let cmd = self.cmd.clone();
        Box::pin(async move { run_command(&name, &cmd, &ctx).await })
    }
}

async fn run_command(name: &str, cmd_line: &str, ctx: &BuildContext) -> Result<()> {
    info!(task = %name, cmd = %cmd_line, "starting command");

    // Build a shell command appropriate for the platform.
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd_line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd_line);
        c
    };

    cmd.current_dir(ctx.root())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for task '{name}'"))?;

    // Always consume stderr so buffers don't fill; log at debug.
    let stderr_pump = child.stderr.take().map(|stderr| {
        let task_name = name.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %task_name, "stderr: {}", line);
            }
        })
    });

    if let Some(stdout) = child.stdout.take() {
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines
            .next_line()
            .await
            .with_context(|| format!("reading stdout of task '{name}'"))?
        {
            println!("[{name}] {line}");
        }
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of task '{name}'"))?;
    if let Some(pump) = stderr_pump {
        let _ = pump.await;
    }

    let code = status.code().unwrap_or(-1);
    info!(task = %name, exit_code = code, success = status.success(), "command exited");

    if status.success() {
        Ok(())
    } else {
        Err(AssetflowError::CommandFailed {
            task: name.to_string(),
            code,
        })
    }
}
