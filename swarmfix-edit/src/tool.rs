//! Best-effort invocation of external build tools.
//!
//! Tool failures are observations, never errors: a rule that shells out records the outcome
//! and carries on with the rest of its patch.

use camino::{Utf8Path, Utf8PathBuf};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::process::{Command, Stdio};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Utf8PathBuf,
}

impl ToolInvocation {
    pub fn new<I, S>(program: impl Into<String>, args: I, cwd: &Utf8Path) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: cwd.to_path_buf(),
        }
    }

    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// The program could not be found.
    Unavailable,
    /// The program ran and exited unsuccessfully (`code` is `None` when killed by a signal).
    Failed { code: Option<i32> },
    Succeeded,
    /// Not executed because the run is a dry run.
    Skipped,
}

impl ToolOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolOutcome::Unavailable => "unavailable",
            ToolOutcome::Failed { .. } => "failed",
            ToolOutcome::Succeeded => "succeeded",
            ToolOutcome::Skipped => "skipped",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Succeeded)
    }
}

/// Runs external programs on behalf of patch actions.
pub trait ToolRunner {
    fn is_available(&self, program: &str) -> bool;
    fn run(&self, invocation: &ToolInvocation) -> ToolOutcome;
}

impl<T: ToolRunner + ?Sized> ToolRunner for &T {
    fn is_available(&self, program: &str) -> bool {
        (**self).is_available(program)
    }

    fn run(&self, invocation: &ToolInvocation) -> ToolOutcome {
        (**self).run(invocation)
    }
}

/// Spawns real processes, inheriting stdout and stderr.
#[derive(Debug, Clone, Default)]
pub struct ProcessToolRunner;

impl ToolRunner for ProcessToolRunner {
    fn is_available(&self, program: &str) -> bool {
        Command::new("which")
            .arg(program)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn run(&self, invocation: &ToolInvocation) -> ToolOutcome {
        info!(command = %invocation.command_line(), cwd = %invocation.cwd, "running tool");
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .status();

        match status {
            Ok(s) if s.success() => ToolOutcome::Succeeded,
            Ok(s) => {
                warn!(command = %invocation.command_line(), code = ?s.code(), "tool failed");
                ToolOutcome::Failed { code: s.code() }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(program = %invocation.program, "tool not found");
                ToolOutcome::Unavailable
            }
            Err(e) => {
                warn!(command = %invocation.command_line(), error = %e, "tool could not start");
                ToolOutcome::Failed { code: None }
            }
        }
    }
}

/// Answers availability from `inner` but never executes anything.
#[derive(Debug, Clone)]
pub struct DryRunToolRunner<R> {
    inner: R,
}

impl<R: ToolRunner> DryRunToolRunner<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: ToolRunner> ToolRunner for DryRunToolRunner<R> {
    fn is_available(&self, program: &str) -> bool {
        self.inner.is_available(program)
    }

    fn run(&self, invocation: &ToolInvocation) -> ToolOutcome {
        info!(command = %invocation.command_line(), cwd = %invocation.cwd, "dry run: would run tool");
        ToolOutcome::Skipped
    }
}

/// Records invocations and answers with a fixed outcome.
#[derive(Debug)]
pub struct RecordingToolRunner {
    available: BTreeSet<String>,
    outcome: ToolOutcome,
    calls: RefCell<Vec<ToolInvocation>>,
}

impl Default for RecordingToolRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingToolRunner {
    /// No program available; every run succeeds.
    pub fn new() -> Self {
        Self {
            available: BTreeSet::new(),
            outcome: ToolOutcome::Succeeded,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_available(mut self, program: &str) -> Self {
        self.available.insert(program.to_string());
        self
    }

    pub fn with_outcome(mut self, outcome: ToolOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.calls.borrow().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(ToolInvocation::command_line)
            .collect()
    }
}

impl ToolRunner for RecordingToolRunner {
    fn is_available(&self, program: &str) -> bool {
        self.available.contains(program)
    }

    fn run(&self, invocation: &ToolInvocation) -> ToolOutcome {
        self.calls.borrow_mut().push(invocation.clone());
        self.outcome.clone()
    }
}
