//! Default command: connect the VPN, then open the remote desktop

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use vrc_core::config::CredentialStore;
use vrc_orchestrator::{OrchestratorState, RunRequest};

use super::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::context::AppContext;
use crate::output::{print_error, print_info, print_success, print_suggestion};
use crate::wizard::TerminalAssistant;

/// Turns orchestrator transitions into progress lines.
///
/// A step is announced when its state is entered and confirmed when the
/// next state arrives.
#[derive(Debug, Default)]
pub struct ProgressRenderer {
    previous: Option<OrchestratorState>,
}

impl ProgressRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines for one transition, as `(completed, message)` pairs
    pub fn lines(&mut self, state: &OrchestratorState) -> Vec<(bool, String)> {
        let mut lines = Vec::new();

        match (&self.previous, state) {
            (_, OrchestratorState::Failed(_)) => {}
            (Some(OrchestratorState::ConnectingVpn { group_name }), _) => {
                lines.push((true, format!("Connected to VPN ({})", display_group(group_name))));
                if *state == OrchestratorState::Done {
                    lines.push((true, "Skipping Remote Desktop".to_string()));
                }
            }
            (Some(OrchestratorState::OpeningRemoteDesktop { .. }), OrchestratorState::Done) => {
                lines.push((true, "Opened Remote Desktop".to_string()));
            }
            _ => {}
        }

        match state {
            OrchestratorState::LoadingDefaults => lines.push((false, "Loading configs".to_string())),
            OrchestratorState::LoadedFromStore => {
                lines.push((true, "Loaded previously used setup".to_string()))
            }
            OrchestratorState::ConnectingVpn { group_name } => lines.push((
                false,
                format!("Connecting to VPN ({})", display_group(group_name)),
            )),
            OrchestratorState::OpeningRemoteDesktop { .. } => {
                lines.push((false, "Opening Remote Desktop".to_string()))
            }
            _ => {}
        }

        self.previous = Some(state.clone());
        lines
    }

    /// Print the lines for one transition
    pub fn render(&mut self, state: &OrchestratorState) {
        for (completed, line) in self.lines(state) {
            if completed {
                print_success(&line);
            } else {
                print_info(&line);
            }
        }
    }
}

fn display_group(group_name: &str) -> &str {
    if group_name.is_empty() {
        "Default"
    } else {
        group_name
    }
}

/// Execute the default command
pub async fn connect_command(
    context: &AppContext,
    setup: bool,
    only_vpn: bool,
    save_only_vpn: bool,
) -> Result<i32> {
    if only_vpn && save_only_vpn {
        context
            .store
            .set("onlyVpn", toml::Value::Boolean(true))
            .context("Failed to save the only-VPN preference")?;
        print_success("Saved only-VPN as the default");
    }

    print_info("Checking for Cisco AnyConnect installation");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let orchestrator = context.orchestrator().with_events(tx);
    let request = RunRequest { setup, only_vpn };

    let mut assistant = TerminalAssistant::new();
    let mut renderer = ProgressRenderer::new();

    let report = {
        let run = orchestrator.run(request, &mut assistant);
        tokio::pin!(run);
        loop {
            tokio::select! {
                biased;
                Some(state) = rx.recv() => renderer.render(&state),
                report = &mut run => break report,
            }
        }
    };
    drop(orchestrator);
    while let Some(state) = rx.recv().await {
        renderer.render(&state);
    }

    match report.failure() {
        None => Ok(EXIT_SUCCESS),
        Some(kind) => {
            print_error(&kind.to_string());
            if let Some(command) = kind.suggestion() {
                print_suggestion(command);
            }
            Ok(EXIT_FAILURE)
        }
    }
}
