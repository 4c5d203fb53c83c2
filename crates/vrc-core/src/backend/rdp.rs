//! Remote-desktop process adapter

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::TimeoutConfig;
use crate::error::BackendError;
use crate::platform::{CommandTable, Operation, Platform};
use crate::traits::{CommandRunner, RdpBackend};

/// Launches and inspects the platform's remote-desktop client
pub struct RemoteDesktopClient<R> {
    runner: R,
    table: CommandTable,
    platform: Platform,
    timeouts: TimeoutConfig,
}

impl<R: CommandRunner> RemoteDesktopClient<R> {
    /// Create an adapter for the running platform
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            table: CommandTable::new(),
            platform: Platform::current(),
            timeouts: TimeoutConfig::default(),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }
}

#[async_trait]
impl<R: CommandRunner> RdpBackend for RemoteDesktopClient<R> {
    async fn open(&self, server: &str) -> Result<(), BackendError> {
        let spec = self
            .table
            .command_for(Operation::OpenRemoteDesktop { server }, &self.platform)?;
        info!(server, "Opening remote desktop");

        // Only the launcher is awaited; the client window outlives it.
        let output = self
            .runner
            .run(&spec, None, self.timeouts.remote_desktop())
            .await?;
        if !output.success {
            return Err(BackendError::ProcessFailure(output.combined().trim().to_string()));
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), BackendError> {
        let spec = self
            .table
            .command_for(Operation::CloseRemoteDesktop, &self.platform)?;
        let output = self
            .runner
            .run(&spec, None, self.timeouts.remote_desktop())
            .await?;
        if !output.success {
            // Nothing to kill
            debug!(command = %spec, "Remote desktop was not running");
        }
        Ok(())
    }

    async fn is_open(&self) -> Result<bool, BackendError> {
        let marker = self.table.rdp_process_marker(&self.platform)?;
        Ok(self
            .runner
            .running_executables()
            .await
            .iter()
            .any(|exe| marker.matches(exe)))
    }
}
