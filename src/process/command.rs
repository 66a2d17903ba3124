//! tokio-backed process runner

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tracing::{debug, warn};

use super::{Invocation, ProcessError, ProcessRunner};

/// Runs commands on the host, resolving the program on `PATH`
#[derive(Debug, Clone, Default)]
pub struct CommandRunner;

impl CommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for CommandRunner {
    async fn run(&self, invocation: &Invocation) -> Result<Vec<u8>, ProcessError> {
        let program = invocation.program.clone();
        let resolved = resolve(invocation).map_err(|source| ProcessError::NotFound {
            program: program.clone(),
            source,
        })?;

        debug!(
            command = %invocation.command_line(),
            working_dir = ?invocation.working_dir,
            "Running command"
        );

        let mut cmd = Command::new(&resolved);
        cmd.args(&invocation.args)
            .envs(&invocation.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &invocation.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;

        let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(stdout), Some(stderr)) => (stdout, stderr),
            _ => {
                return Err(ProcessError::Io {
                    program,
                    source: std::io::Error::new(
                        std::io::ErrorKind::BrokenPipe,
                        "child output pipes unavailable",
                    ),
                    output: Vec::new(),
                })
            }
        };

        let mut output = Vec::new();
        let waited = tokio::time::timeout(
            invocation.timeout,
            drain(&mut child, stdout, stderr, &mut output),
        )
        .await;

        let status = match waited {
            Ok(Ok(status)) => status,
            Ok(Err(source)) => {
                return Err(ProcessError::Io {
                    program,
                    source,
                    output,
                })
            }
            Err(_) => {
                warn!(command = %invocation.command_line(), "Command timed out, killing it");
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "Failed to kill timed out command");
                }
                return Err(ProcessError::TimedOut {
                    program,
                    timeout: invocation.timeout,
                    output,
                });
            }
        };

        if status.success() {
            Ok(output)
        } else {
            Err(ProcessError::Failed {
                program,
                code: status.code(),
                output,
            })
        }
    }
}

/// Look the program up on the invocation's `PATH` when it sets one, else on
/// the runner's own
fn resolve(invocation: &Invocation) -> Result<PathBuf, which::Error> {
    match invocation.env.get("PATH") {
        Some(paths) => {
            let cwd = match &invocation.working_dir {
                Some(dir) => dir.clone(),
                None => std::env::current_dir().unwrap_or_default(),
            };
            which::which_in(&invocation.program, Some(paths), cwd)
        }
        None => which::which(&invocation.program),
    }
}

/// Read stdout and stderr line by line into `output` as lines arrive, then
/// wait for the child to exit.
async fn drain(
    child: &mut Child,
    stdout: ChildStdout,
    stderr: ChildStderr,
    output: &mut Vec<u8>,
) -> std::io::Result<ExitStatus> {
    let mut stdout = BufReader::new(stdout);
    let mut stderr = BufReader::new(stderr);
    let mut out_line = Vec::new();
    let mut err_line = Vec::new();
    let mut out_done = false;
    let mut err_done = false;

    while !(out_done && err_done) {
        tokio::select! {
            read = stdout.read_until(b'\n', &mut out_line), if !out_done => {
                if read? == 0 {
                    out_done = true;
                }
                output.append(&mut out_line);
            }
            read = stderr.read_until(b'\n', &mut err_line), if !err_done => {
                if read? == 0 {
                    err_done = true;
                }
                output.append(&mut err_line);
            }
        }
    }

    child.wait().await
}
