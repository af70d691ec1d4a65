// src/pipeline/report.rs

use std::io::Write as _;
use std::sync::{Arc, Mutex};

/// Where lint and accessibility reports go.
///
/// The CLI prints to stdout; tests swap in a buffer so the rendered report
/// can be asserted on.
#[derive(Clone, Debug, Default)]
pub struct ReportSink {
    target: Arc<Mutex<Target>>,
}

#[derive(Debug, Default)]
enum Target {
    #[default]
    Stdout,
    Buffer(String),
}

impl ReportSink {
    pub fn stdout() -> Self {
        Self::default()
    }

    pub fn buffer() -> Self {
        Self {
            target: Arc::new(Mutex::new(Target::Buffer(String::new()))),
        }
    }

    /// Write one report followed by a newline.
    pub fn emit(&self, report: &str) {
        let mut target = match self.target.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match &mut *target {
            Target::Stdout => {
                let mut out = std::io::stdout().lock();
                let _ = writeln!(out, "{report}");
            }
            Target::Buffer(buf) => {
                buf.push_str(report);
                buf.push('\n');
            }
        }
    }

    /// Everything emitted so far; empty for the stdout sink.
    pub fn contents(&self) -> String {
        let target = match self.target.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match &*target {
            Target::Stdout => String::new(),
            Target::Buffer(buf) => buf.clone(),
        }
    }
}
