//! Command runner backed by `tokio::process`

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio_util::codec::FramedRead;
use tracing::{debug, warn};
use vrc_anyconnect::GroupPromptCodec;

use crate::error::BackendError;
use crate::platform::CommandSpec;
use crate::traits::{CommandRunner, ProcessOutput, PromptRead};

/// Runs commands on the local machine
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(spec: &CommandSpec, stdin: Stdio) -> Command {
        let mut cmd = Command::new(&spec.executable);
        cmd.args(&spec.args)
            .stdin(stdin)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    fn spawn_error(spec: &CommandSpec, source: std::io::Error) -> BackendError {
        BackendError::Spawn {
            command: spec.to_string(),
            source,
        }
    }

    fn timeout_error(spec: &CommandSpec, after: Duration) -> BackendError {
        BackendError::Timeout {
            command: spec.to_string(),
            after,
        }
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        spec: &CommandSpec,
        stdin: Option<&[u8]>,
        timeout: Duration,
    ) -> Result<ProcessOutput, BackendError> {
        let stdin_mode = if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        };

        debug!(command = %spec, "Spawning process");
        let mut child = Self::command(spec, stdin_mode)
            .spawn()
            .map_err(|e| Self::spawn_error(spec, e))?;

        let finished = async {
            if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
                // The client may exit before reading everything; its output says why.
                if let Err(e) = pipe.write_all(input).await {
                    debug!(command = %spec, "Failed to write stdin: {}", e);
                }
                let _ = pipe.shutdown().await;
            }
            child.wait_with_output().await
        };

        let output = tokio::time::timeout(timeout, finished)
            .await
            .map_err(|_| Self::timeout_error(spec, timeout))?
            .map_err(|e| Self::spawn_error(spec, e))?;

        debug!(command = %spec, status = %output.status, "Process exited");

        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
        })
    }

    async fn read_until_prompt(
        &self,
        spec: &CommandSpec,
        timeout: Duration,
    ) -> Result<PromptRead, BackendError> {
        debug!(command = %spec, "Spawning interactive process");
        // stdin stays open so the client blocks at its prompt instead of reading EOF
        let mut child = Self::command(spec, Stdio::piped())
            .spawn()
            .map_err(|e| Self::spawn_error(spec, e))?;
        let _stdin = child.stdin.take();

        let stdout = child.stdout.take().ok_or_else(|| {
            Self::spawn_error(
                spec,
                std::io::Error::new(std::io::ErrorKind::Other, "stdout was not captured"),
            )
        })?;
        let mut frames = FramedRead::new(stdout, GroupPromptCodec::new());

        let read = tokio::time::timeout(timeout, frames.next()).await;

        if let Err(e) = child.kill().await {
            debug!(command = %spec, "Process already gone: {}", e);
        }

        match read.map_err(|_| Self::timeout_error(spec, timeout))? {
            Some(Ok(text)) => Ok(PromptRead::Prompt(text)),
            Some(Err(e)) => Err(BackendError::Response(e)),
            None => Ok(PromptRead::Exited),
        }
    }

    async fn running_executables(&self) -> Vec<PathBuf> {
        let listing = tokio::task::spawn_blocking(|| {
            let system = sysinfo::System::new_all();
            system
                .processes()
                .values()
                .filter_map(|process| process.exe().map(|exe| exe.to_path_buf()))
                .collect::<Vec<_>>()
        })
        .await;

        match listing {
            Ok(executables) => executables,
            Err(e) => {
                warn!("Failed to list processes: {}", e);
                Vec::new()
            }
        }
    }
}
