//! External command execution.
//!
//! Every external program projadm starts goes through [`run_command`], which
//! is the only place a [`RunContext`] decides whether a process is spawned.
//! A command that does not finish with exit code 0 is fatal to the
//! invocation; there are no retries.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, error, info};

use projadm_core::RunContext;

use crate::error::AdminError;

/// A program plus its argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Lifecycle state of an [`Invocation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecState {
    NotRun,
    /// The process ran to completion; see [`CommandResult::exit_code`].
    Finished,
    /// The process could not be started or was killed.
    Failed,
}

/// Captured outcome of an executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub state: ExecState,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    fn not_run() -> Self {
        Self {
            state: ExecState::NotRun,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.state == ExecState::Finished && self.exit_code == Some(0)
    }

    /// Standard output split into lines.
    pub fn lines(&self) -> Vec<&str> {
        self.stdout.lines().collect()
    }

    fn status_label(&self) -> String {
        match (self.state, self.exit_code) {
            (ExecState::NotRun, _) => "not run".to_string(),
            (ExecState::Finished, Some(code)) => format!("exit code {code}"),
            (ExecState::Finished, None) | (ExecState::Failed, None) => "did not finish".to_string(),
            (ExecState::Failed, Some(code)) => format!("failed with exit code {code}"),
        }
    }
}

/// Spawn `invocation`, wait for it and capture both output streams.
///
/// Never returns an error: failure to start is reported through
/// [`ExecState::Failed`] with the OS error in `stderr`.
pub fn execute(invocation: &Invocation) -> CommandResult {
    let mut result = CommandResult::not_run();
    debug!("executing: {invocation}");

    match Command::new(&invocation.program)
        .args(&invocation.args)
        .stdin(Stdio::null())
        .output()
    {
        Ok(output) => {
            result.stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            result.stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            result.exit_code = output.status.code();
            // No exit code means the process was terminated by a signal.
            result.state = if result.exit_code.is_some() {
                ExecState::Finished
            } else {
                ExecState::Failed
            };
        }
        Err(e) => {
            result.state = ExecState::Failed;
            result.stderr = e.to_string();
        }
    }
    result
}

/// Run `invocation` unless `ctx` is a dry run.
///
/// Returns `Ok(None)` in dry-run mode after logging the command line. On any
/// outcome other than a clean exit, logs `failure_message` with the captured
/// output and returns [`AdminError::Command`].
pub fn run_command(
    ctx: &RunContext,
    invocation: &Invocation,
    failure_message: &str,
) -> Result<Option<CommandResult>, AdminError> {
    if ctx.is_dry_run() {
        info!("{}{invocation}", ctx.prefix());
        return Ok(None);
    }

    let result = execute(invocation);
    if !result.succeeded() {
        error!("{failure_message}");
        error!("Standard output: {}", result.stdout);
        error!("Error output: {}", result.stderr);
        return Err(AdminError::Command {
            message: failure_message.to_string(),
            command: invocation.to_string(),
            status: result.status_label(),
            stdout: result.stdout,
            stderr: result.stderr,
        });
    }

    if !result.stderr.is_empty() {
        debug!("{}", result.stderr);
    }
    Ok(Some(result))
}
