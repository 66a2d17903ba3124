//! Subprocess execution
//!
//! The runner never touches the process table directly; every command goes
//! through a [`ProcessRunner`] so tests can substitute a recording fake.
//! Environment overrides travel with each [`Invocation`] instead of being
//! written into the current process environment.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

pub mod command;

pub use command::CommandRunner;

/// Default bound for a single command
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3600);

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("command {program:?} not found: {source}")]
    NotFound {
        program: String,
        source: which::Error,
    },

    #[error("failed to start {program:?}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("reading output of {program:?}: {source}")]
    Io {
        program: String,
        source: std::io::Error,
        output: Vec<u8>,
    },

    #[error("{program:?} {}", exit_description(.code))]
    Failed {
        program: String,
        code: Option<i32>,
        output: Vec<u8>,
    },

    #[error("{program:?} timed out after {timeout:?}")]
    TimedOut {
        program: String,
        timeout: Duration,
        output: Vec<u8>,
    },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

impl ProcessError {
    /// Combined output captured before the error, empty if the process never ran
    pub fn output(&self) -> &[u8] {
        match self {
            ProcessError::NotFound { .. } | ProcessError::Spawn { .. } => &[],
            ProcessError::Io { output, .. }
            | ProcessError::Failed { output, .. }
            | ProcessError::TimedOut { output, .. } => output,
        }
    }

    pub fn into_output(self) -> Vec<u8> {
        match self {
            ProcessError::NotFound { .. } | ProcessError::Spawn { .. } => Vec::new(),
            ProcessError::Io { output, .. }
            | ProcessError::Failed { output, .. }
            | ProcessError::TimedOut { output, .. } => output,
        }
    }
}

/// A command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: HashMap<String, String>,
    pub timeout: Duration,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            env: HashMap::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn envs(mut self, env: HashMap<String, String>) -> Self {
        self.env.extend(env);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `program arg1 arg2`, for logs
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs commands and captures their combined stdout/stderr
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run to completion. Returns the output on a zero exit; any other
    /// outcome is an error carrying whatever output was captured.
    async fn run(&self, invocation: &Invocation) -> Result<Vec<u8>, ProcessError>;
}
