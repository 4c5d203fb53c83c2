//! External process execution

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::BackendError;
use crate::platform::CommandSpec;

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit status was success
    pub success: bool,
}

impl ProcessOutput {
    /// Stdout followed by stderr; the client reports errors on either
    pub fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr),
        }
    }
}

/// Result of reading an interactive process up to the group prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptRead {
    /// The prompt appeared; carries everything read up to it
    Prompt(String),
    /// The process exited without prompting
    Exited,
}

/// Runs external commands on behalf of the adapters
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion, feeding `stdin` if given, bounded by `timeout`
    async fn run(
        &self,
        command: &CommandSpec,
        stdin: Option<&[u8]>,
        timeout: Duration,
    ) -> Result<ProcessOutput, BackendError>;

    /// Read stdout until the group prompt appears, then kill the process
    async fn read_until_prompt(
        &self,
        command: &CommandSpec,
        timeout: Duration,
    ) -> Result<PromptRead, BackendError>;

    /// Executable paths of all running processes
    async fn running_executables(&self) -> Vec<PathBuf>;

    /// Whether a file exists at `path`
    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}
