//! VPN process adapter for the AnyConnect command-line client

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use vrc_anyconnect::{
    classify_connect, classify_disconnect, default_groups, is_connected, parse_group_listing,
    CliResponse, CliScriptCodec, DisconnectOutcome, ScriptCommand,
};

use crate::config::TimeoutConfig;
use crate::error::BackendError;
use crate::platform::{CommandTable, Operation, Platform};
use crate::traits::{CommandRunner, PromptRead, Reachability, VpnBackend};
use crate::types::{ConnectionOutcome, VpnCredentials, VpnGroup};

/// Drives the AnyConnect CLI through a [`CommandRunner`]
pub struct AnyConnectCli<R> {
    runner: R,
    reachability: Arc<dyn Reachability>,
    table: CommandTable,
    platform: Platform,
    timeouts: TimeoutConfig,
}

impl<R: CommandRunner> AnyConnectCli<R> {
    /// Create an adapter for the running platform
    pub fn new(runner: R, reachability: Arc<dyn Reachability>) -> Self {
        Self {
            runner,
            reachability,
            table: CommandTable::new(),
            platform: Platform::current(),
            timeouts: TimeoutConfig::default(),
        }
    }

    /// Target a specific platform
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Use a customised command table
    pub fn with_table(mut self, table: CommandTable) -> Self {
        self.table = table;
        self
    }

    /// Bound every spawned process with these timeouts
    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Access the underlying runner
    pub fn runner(&self) -> &R {
        &self.runner
    }

    async fn ensure_online(&self) -> Result<(), BackendError> {
        if self.reachability.is_online().await {
            Ok(())
        } else {
            warn!("Reachability check failed");
            Err(BackendError::NoInternet)
        }
    }

    fn response(&self, raw: String, exited_cleanly: bool) -> CliResponse {
        CliResponse::new(raw, exited_cleanly).with_flavor(self.table.flavor(&self.platform))
    }
}

#[async_trait]
impl<R: CommandRunner> VpnBackend for AnyConnectCli<R> {
    fn is_installed(&self) -> Result<bool, BackendError> {
        let path = self.table.vpn_client_path(&self.platform)?;
        Ok(self.runner.file_exists(&path))
    }

    async fn connect(
        &self,
        server: &str,
        group: &str,
        username: &str,
        password: &str,
    ) -> Result<ConnectionOutcome, BackendError> {
        let credentials = VpnCredentials {
            server: server.to_string(),
            group: group.to_string(),
            group_name: String::new(),
            username: username.to_string(),
            password: password.to_string(),
        };
        if let Some(field) = credentials.first_missing_for_connect() {
            return Err(BackendError::MissingCredentials { field });
        }

        if self.ensure_online().await.is_err() {
            return Ok(ConnectionOutcome::NoInternet);
        }

        let spec = match self.table.command_for(Operation::Connect, &self.platform) {
            Ok(spec) => spec,
            Err(BackendError::UnsupportedPlatform(os)) => {
                return Ok(ConnectionOutcome::UnsupportedPlatform(os))
            }
            Err(e) => return Err(e),
        };

        info!(server, group, "Connecting to VPN");
        let script = CliScriptCodec::script(ScriptCommand::Connect {
            server: credentials.server,
            group: credentials.group,
            username: credentials.username,
            password: credentials.password,
        });
        let output = self
            .runner
            .run(&spec, Some(&script[..]), self.timeouts.connect())
            .await?;

        let response = self
            .response(output.combined(), output.success)
            .with_server(server);
        let outcome = classify_connect(&response);
        debug!(%outcome, "Connect finished");
        Ok(outcome)
    }

    async fn disconnect(&self) -> Result<DisconnectOutcome, BackendError> {
        let spec = self.table.command_for(Operation::Disconnect, &self.platform)?;
        let script = CliScriptCodec::script(ScriptCommand::Disconnect);
        let output = self
            .runner
            .run(&spec, Some(&script[..]), self.timeouts.disconnect())
            .await?;

        match classify_disconnect(&self.response(output.combined(), output.success)) {
            DisconnectOutcome::Failed(raw) => Err(BackendError::ProcessFailure(raw)),
            outcome => {
                debug!(?outcome, "Disconnect finished");
                Ok(outcome)
            }
        }
    }

    async fn query_status(&self) -> Result<bool, BackendError> {
        let spec = self.table.command_for(Operation::Status, &self.platform)?;
        let output = self.runner.run(&spec, None, self.timeouts.query()).await?;
        Ok(is_connected(&output.stdout)?)
    }

    async fn list_groups(&self, server: &str) -> Result<Vec<VpnGroup>, BackendError> {
        if server.trim().is_empty() {
            return Err(BackendError::MissingCredentials { field: "server" });
        }
        self.ensure_online().await?;

        let spec = self
            .table
            .command_for(Operation::ListGroups { server }, &self.platform)?;

        match self
            .runner
            .read_until_prompt(&spec, self.timeouts.group_listing())
            .await?
        {
            PromptRead::Prompt(text) => {
                let groups = parse_group_listing(&text);
                if groups.is_empty() {
                    info!(server, "Group prompt listed no groups, using the default group");
                    return Ok(default_groups());
                }
                debug!(server, count = groups.len(), "Listed VPN groups");
                Ok(groups)
            }
            PromptRead::Exited => {
                info!(server, "VPN client offered no group choice, using the default group");
                Ok(default_groups())
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::platform::CommandSpec;
    use crate::traits::ProcessOutput;
    use std::collections::VecDeque;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays canned outputs and records every spawn
    #[derive(Default)]
    pub(crate) struct ScriptedRunner {
        pub(crate) outputs: Mutex<VecDeque<ProcessOutput>>,
        pub(crate) prompts: Mutex<VecDeque<PromptRead>>,
        pub(crate) spawned: Mutex<Vec<(String, Option<Vec<u8>>)>>,
        pub(crate) executables: Vec<PathBuf>,
        pub(crate) installed: bool,
    }

    impl ScriptedRunner {
        pub(crate) fn with_output(self, stdout: &str, success: bool) -> Self {
            self.outputs.lock().unwrap().push_back(ProcessOutput {
                stdout: stdout.to_string(),
                stderr: String::new(),
                success,
            });
            self
        }

        pub(crate) fn with_prompt(self, read: PromptRead) -> Self {
            self.prompts.lock().unwrap().push_back(read);
            self
        }

        pub(crate) fn spawn_count(&self) -> usize {
            self.spawned.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(
            &self,
            command: &CommandSpec,
            stdin: Option<&[u8]>,
            _timeout: Duration,
        ) -> Result<ProcessOutput, BackendError> {
            self.spawned
                .lock()
                .unwrap()
                .push((command.to_string(), stdin.map(<[u8]>::to_vec)));
            Ok(self.outputs.lock().unwrap().pop_front().unwrap_or_default())
        }

        async fn read_until_prompt(
            &self,
            command: &CommandSpec,
            _timeout: Duration,
        ) -> Result<PromptRead, BackendError> {
            self.spawned.lock().unwrap().push((command.to_string(), None));
            Ok(self
                .prompts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(PromptRead::Exited))
        }

        async fn running_executables(&self) -> Vec<PathBuf> {
            self.executables.clone()
        }

        fn file_exists(&self, _path: &Path) -> bool {
            self.installed
        }
    }

    pub(crate) struct Online(pub(crate) bool);

    #[async_trait]
    impl Reachability for Online {
        async fn is_online(&self) -> bool {
            self.0
        }
    }

    fn adapter(runner: ScriptedRunner, platform: Platform) -> AnyConnectCli<ScriptedRunner> {
        AnyConnectCli::new(runner, Arc::new(Online(true))).with_platform(platform)
    }

    #[tokio::test]
    async fn test_connect_missing_credentials_spawns_nothing() {
        let cli = adapter(ScriptedRunner::default(), Platform::Windows);

        for (server, group, username, password) in [
            ("", "1", "knut", "pw"),
            ("vpn", "", "knut", "pw"),
            ("vpn", "1", "", "pw"),
            ("vpn", "1", "knut", ""),
        ] {
            let result = cli.connect(server, group, username, password).await;
            assert!(matches!(result, Err(BackendError::MissingCredentials { .. })));
        }
        assert_eq!(cli.runner().spawn_count(), 0);
    }

    #[tokio::test]
    async fn test_connect_offline_spawns_nothing() {
        let cli = AnyConnectCli::new(ScriptedRunner::default(), Arc::new(Online(false)))
            .with_platform(Platform::Windows);

        let outcome = cli.connect("vpn", "1", "knut", "pw").await.unwrap();
        assert_eq!(outcome, ConnectionOutcome::NoInternet);
        assert_eq!(cli.runner().spawn_count(), 0);
    }

    #[tokio::test]
    async fn test_connect_unsupported_platform() {
        let cli = adapter(ScriptedRunner::default(), Platform::Unsupported("linux".into()));
        let outcome = cli.connect("vpn", "1", "knut", "pw").await.unwrap();
        assert_eq!(outcome, ConnectionOutcome::UnsupportedPlatform("linux".into()));
        assert!(matches!(
            cli.is_installed(),
            Err(BackendError::UnsupportedPlatform(os)) if os == "linux"
        ));
    }

    #[tokio::test]
    async fn test_connect_sends_login_token_script() {
        let runner = ScriptedRunner::default().with_output(
            "VPN> connect example-server\n  >> state: Connected\n  >> notice: Connected to example-server.\nVPN>",
            false,
        );
        let cli = adapter(runner, Platform::Windows);

        let outcome = cli
            .connect("example-server", "1", "knut", "supersecret")
            .await
            .unwrap();
        assert_eq!(outcome, ConnectionOutcome::AlreadyConnected);

        let spawned = cli.runner().spawned.lock().unwrap();
        assert!(spawned[0].0.ends_with("vpncli.exe -s"));
        assert_eq!(
            spawned[0].1.as_deref(),
            Some(&b"connect example-server\n1\nknut\nsupersecret\ny\n"[..])
        );
    }

    #[tokio::test]
    async fn test_connect_login_failed() {
        let runner = ScriptedRunner::default().with_output(
            "  >> Please enter your username and password.\n  >> Login failed.\nVPN>",
            false,
        );
        let cli = adapter(runner, Platform::Windows);
        let outcome = cli.connect("vpn", "1", "knut", "wrong").await.unwrap();
        assert_eq!(outcome, ConnectionOutcome::IncorrectLogin);
    }

    #[tokio::test]
    async fn test_connect_unrecognised_failure_carries_output() {
        let runner = ScriptedRunner::default()
            .with_output("  >> error: The VPN service is not available.", false);
        let cli = adapter(runner, Platform::Windows);
        let outcome = cli.connect("vpn", "1", "knut", "pw").await.unwrap();
        assert!(
            matches!(outcome, ConnectionOutcome::ProcessFailure(raw) if raw.contains("service is not available"))
        );
    }

    #[tokio::test]
    async fn test_disconnect_twice_is_idempotent() {
        let runner = ScriptedRunner::default()
            .with_output("  >> state: Disconnecting\n  >> state: Disconnected\n  >> notice: Ready to connect.\n", true)
            .with_output("  >> error: The VPN client is not connected.\nVPN>", false);
        let cli = adapter(runner, Platform::MacOs);

        assert_eq!(cli.disconnect().await.unwrap(), DisconnectOutcome::Disconnected);
        assert_eq!(cli.disconnect().await.unwrap(), DisconnectOutcome::NotConnected);
        assert_eq!(cli.runner().spawn_count(), 2);
    }

    #[tokio::test]
    async fn test_disconnect_failure_is_error() {
        let runner = ScriptedRunner::default().with_output("  >> error: Something broke.", false);
        let cli = adapter(runner, Platform::Windows);
        assert!(matches!(
            cli.disconnect().await,
            Err(BackendError::ProcessFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_query_status() {
        let runner = ScriptedRunner::default().with_output(
            "    Management Connection State: Disconnected (user tunnel active)\n    Connection State:            Connected\n",
            true,
        );
        let cli = adapter(runner, Platform::MacOs);
        assert!(cli.query_status().await.unwrap());

        let spawned = cli.runner().spawned.lock().unwrap();
        assert_eq!(spawned[0].0, "/opt/cisco/anyconnect/bin/vpn stats");
        assert!(spawned[0].1.is_none());
    }

    #[tokio::test]
    async fn test_query_status_without_state_line_fails() {
        let runner = ScriptedRunner::default().with_output("garbage", true);
        let cli = adapter(runner, Platform::MacOs);
        assert!(matches!(
            cli.query_status().await,
            Err(BackendError::Response(_))
        ));
    }

    #[tokio::test]
    async fn test_list_groups_from_prompt() {
        let runner = ScriptedRunner::default().with_prompt(PromptRead::Prompt(
            "...Group: ...Please enter your username and password.\n0) Default\n1) Engineering\n".into(),
        ));
        let cli = adapter(runner, Platform::MacOs);

        let groups = cli.list_groups("example-server").await.unwrap();
        assert_eq!(
            groups,
            vec![VpnGroup::new("0", "Default"), VpnGroup::new("1", "Engineering")]
        );
    }

    #[tokio::test]
    async fn test_list_groups_early_exit_is_default_group() {
        let cli = adapter(ScriptedRunner::default().with_prompt(PromptRead::Exited), Platform::MacOs);
        let groups = cli.list_groups("example-server").await.unwrap();
        assert_eq!(groups, vec![VpnGroup::new("0", "Default")]);
    }

    #[tokio::test]
    async fn test_list_groups_unparsable_prompt_is_default_group() {
        let runner = ScriptedRunner::default().with_prompt(PromptRead::Prompt(
            "...Group: ...Please enter your username and password.\n".into(),
        ));
        let cli = adapter(runner, Platform::MacOs);
        let groups = cli.list_groups("example-server").await.unwrap();
        assert_eq!(groups, vec![VpnGroup::new("0", "Default")]);
    }

    #[tokio::test]
    async fn test_list_groups_offline() {
        let cli = AnyConnectCli::new(ScriptedRunner::default(), Arc::new(Online(false)))
            .with_platform(Platform::MacOs);
        assert!(matches!(
            cli.list_groups("example-server").await,
            Err(BackendError::NoInternet)
        ));
        assert_eq!(cli.runner().spawn_count(), 0);
    }

    #[test]
    fn test_is_installed_checks_client_path() {
        let runner = ScriptedRunner {
            installed: true,
            ..Default::default()
        };
        assert!(adapter(runner, Platform::MacOs).is_installed().unwrap());
        assert!(!adapter(ScriptedRunner::default(), Platform::MacOs)
            .is_installed()
            .unwrap());
    }
}
