//! Shell executor
//!
//! Runs one external command per call and captures its output. No shell is
//! involved; arguments are passed as a list. Each child leads its own process
//! group so a timeout can reach everything it started, including the utility
//! running under `sudo`.

use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, warn};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::ExecError;

/// Time between SIGTERM and SIGKILL when a command group is torn down.
const KILL_GRACE: Duration = Duration::from_millis(500);

/// A single command invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<Bytes>,
    /// Send stdout to /dev/null instead of capturing it.
    pub discard_stdout: bool,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_stdin(mut self, input: Bytes) -> Self {
        self.stdin = Some(input);
        self
    }

    pub fn discard_stdout(mut self) -> Self {
        self.discard_stdout = true;
        self
    }

    /// Program and arguments joined for log output.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
    pub code: i32,
}

impl CommandOutput {
    /// Stdout decoded lossily as UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// Anything that can run a [`CommandSpec`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs the command. Non-zero exit is reported as [`ExecError::Failed`].
    async fn run(&self, spec: CommandSpec) -> Result<CommandOutput, ExecError>;
}

/// Runs commands as child processes of the server.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    timeout: Duration,
}

impl ShellExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for ShellExecutor {
    async fn run(&self, spec: CommandSpec) -> Result<CommandOutput, ExecError> {
        debug!("Running: {}", spec.command_line());

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(if spec.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(if spec.discard_stdout {
                Stdio::null()
            } else {
                Stdio::piped()
            })
            .stderr(Stdio::piped())
            .process_group(0)
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| ExecError::Spawn {
            program: spec.program.clone(),
            source,
        })?;

        // Feed stdin from its own task so a full stdout pipe cannot deadlock us.
        let writer = match (spec.stdin, child.stdin.take()) {
            (Some(input), Some(mut pipe)) => Some(tokio::spawn(async move {
                let result = pipe.write_all(&input).await;
                drop(pipe);
                result
            })),
            _ => None,
        };

        let group = child.id().and_then(|id| i32::try_from(id).ok());

        // Kept alive until the group is signalled so the direct child is not
        // killed first and cannot orphan what it started.
        let wait = child.wait_with_output();
        tokio::pin!(wait);

        let output = match timeout(self.timeout, &mut wait).await {
            Ok(result) => result.map_err(|source| ExecError::Io {
                program: spec.program.clone(),
                source,
            })?,
            Err(_) => {
                warn!(
                    "Command timed out after {:?}: {}",
                    self.timeout, spec.program
                );
                if let Some(group) = group {
                    signal_group(group, libc::SIGTERM);
                    // sudo relays SIGTERM to its command; give both a moment.
                    let _ = timeout(KILL_GRACE, &mut wait).await;
                    signal_group(group, libc::SIGKILL);
                }
                return Err(ExecError::Timeout {
                    program: spec.program,
                    timeout: self.timeout,
                });
            }
        };

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                // The child may exit without reading everything; its exit status tells the story.
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => warn!("Failed writing stdin to {}: {}", spec.program, e),
                Err(e) => warn!("Stdin writer for {} panicked: {}", spec.program, e),
            }
        }

        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            warn!("Command failed ({}): {} {}", code, spec.program, stderr.trim());
            return Err(ExecError::Failed { code, stderr });
        }

        Ok(CommandOutput {
            stdout: output.stdout,
            stderr,
            code,
        })
    }
}

fn signal_group(group: i32, signal: libc::c_int) {
    // SAFETY: `group` is the positive id of a child spawned as its own
    // process group leader; killpg only sends a signal.
    let result = unsafe { libc::killpg(group, signal) };
    if result != 0 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            debug!("Failed to signal process group {}: {}", group, err);
        }
    }
}
