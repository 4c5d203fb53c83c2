//! The connection state machine

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};
use vrc_core::config::CredentialStore;
use vrc_core::traits::{DefaultsProvider, RdpBackend, VpnBackend};
use vrc_core::{
    BackendError, ConnectionOutcome, DefaultsError, RdpDefaults, SavedConfig, VpnDefaults,
};

use crate::flows::check_installation;
use crate::groups::{is_group_number, GroupCatalog};
use crate::setup::{SetupAssistant, SetupError, SetupForm};
use crate::state::{FailureKind, OrchestratorState};

/// What the caller asked for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunRequest {
    /// Run the setup wizard even when stored credentials are complete
    pub setup: bool,
    /// Skip the remote-desktop step
    pub only_vpn: bool,
}

/// Outcome of one run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// `Done` or `Failed`
    pub final_state: OrchestratorState,
    /// Every state entered, in order, ending with `final_state`
    pub transitions: Vec<OrchestratorState>,
    /// Credentials the run connected with
    pub config: SavedConfig,
    /// Result of the VPN step, when reached
    pub vpn_outcome: Option<ConnectionOutcome>,
    /// Whether the remote-desktop step was skipped
    pub only_vpn: bool,
}

impl RunReport {
    pub fn is_done(&self) -> bool {
        self.final_state == OrchestratorState::Done
    }

    /// Failure kind, if the run failed
    pub fn failure(&self) -> Option<&FailureKind> {
        match &self.final_state {
            OrchestratorState::Failed(kind) => Some(kind),
            _ => None,
        }
    }
}

/// Sequences installation check, credential resolution, setup, VPN connect
/// and remote-desktop launch.
pub struct ConnectionOrchestrator {
    vpn: Arc<dyn VpnBackend>,
    rdp: Arc<dyn RdpBackend>,
    store: Arc<dyn CredentialStore>,
    defaults: Arc<dyn DefaultsProvider>,
    catalog: GroupCatalog,
    events: Option<UnboundedSender<OrchestratorState>>,
}

/// Per-run bookkeeping
struct Run<'a> {
    transitions: Vec<OrchestratorState>,
    events: Option<&'a UnboundedSender<OrchestratorState>>,
    config: SavedConfig,
    vpn_outcome: Option<ConnectionOutcome>,
}

impl Run<'_> {
    fn enter(&mut self, state: OrchestratorState) {
        match &state {
            OrchestratorState::Failed(kind) => warn!(%kind, "Run failed"),
            other => info!(state = %other, "Entering state"),
        }
        if let Some(events) = self.events {
            // The receiver may have gone away; the run continues regardless.
            let _ = events.send(state.clone());
        }
        self.transitions.push(state);
    }

    fn finish(mut self, terminal: OrchestratorState) -> RunReport {
        self.enter(terminal.clone());
        RunReport {
            final_state: terminal,
            transitions: self.transitions,
            only_vpn: self.config.only_vpn,
            config: self.config,
            vpn_outcome: self.vpn_outcome,
        }
    }

    fn fail(self, kind: FailureKind) -> RunReport {
        self.finish(OrchestratorState::Failed(kind))
    }
}

impl ConnectionOrchestrator {
    pub fn new(
        vpn: Arc<dyn VpnBackend>,
        rdp: Arc<dyn RdpBackend>,
        store: Arc<dyn CredentialStore>,
        defaults: Arc<dyn DefaultsProvider>,
    ) -> Self {
        Self {
            catalog: GroupCatalog::new(vpn.clone()),
            vpn,
            rdp,
            store,
            defaults,
            events: None,
        }
    }

    /// Publish every state transition on `events`
    pub fn with_events(mut self, events: UnboundedSender<OrchestratorState>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn catalog(&self) -> &GroupCatalog {
        &self.catalog
    }

    /// Drive one run to `Done` or `Failed`
    pub async fn run(
        &self,
        request: RunRequest,
        assistant: &mut dyn SetupAssistant,
    ) -> RunReport {
        let mut run = Run {
            transitions: Vec::new(),
            events: self.events.as_ref(),
            config: SavedConfig::default(),
            vpn_outcome: None,
        };

        run.enter(OrchestratorState::CheckingInstallation);
        if let Err(kind) = check_installation(self.vpn.as_ref()) {
            return run.fail(kind);
        }

        run.enter(OrchestratorState::LoadingDefaults);
        let (stored, status) = tokio::join!(async { self.store.load() }, self.vpn.query_status());

        let stored = match stored {
            Ok(stored) => stored.unwrap_or_default(),
            Err(e) => return run.fail(FailureKind::Fatal(format!("Failed to read credentials: {}", e))),
        };
        let connected = match status {
            Ok(connected) => connected,
            Err(e) => {
                warn!("VPN status query failed, assuming disconnected: {}", e);
                false
            }
        };

        let only_vpn = request.only_vpn || stored.only_vpn;
        let mut config = stored;

        let vpn_defaults = if connected {
            info!("VPN already connected, skipping VPN defaults");
            VpnDefaults::default()
        } else {
            match self.vpn_defaults().await {
                Ok(defaults) => defaults,
                Err(e) if e.is_no_internet() => return run.fail(FailureKind::NoInternet),
                Err(e) => {
                    warn!("VPN defaults unavailable: {}", e);
                    VpnDefaults::default()
                }
            }
        };

        let rdp_defaults = if only_vpn {
            RdpDefaults::default()
        } else {
            match self.defaults.rdp_defaults().await {
                Ok(defaults) => defaults,
                Err(e) if e.is_no_internet() => return run.fail(FailureKind::NoInternet),
                Err(e) => {
                    warn!("Remote desktop defaults unavailable: {}", e);
                    RdpDefaults::default()
                }
            }
        };

        config.merge_defaults(&vpn_defaults, &rdp_defaults);
        config.only_vpn = only_vpn;
        run.config = config;

        if request.setup || (!run.config.is_complete() && !connected) {
            run.enter(OrchestratorState::SettingUp);
            let form = SetupForm::new(run.config.clone());
            match assistant.run_setup(form, &self.catalog).await {
                Ok(completed) => {
                    if let Err(e) = self.store.save(&completed) {
                        return run.fail(FailureKind::Fatal(format!("Failed to save credentials: {}", e)));
                    }
                    run.config = completed;
                }
                Err(e) => return run.fail(setup_failure(e)),
            }
        } else {
            run.enter(OrchestratorState::LoadedFromStore);
        }

        run.enter(OrchestratorState::ConnectingVpn {
            group_name: run.config.vpn.group_name.clone(),
        });
        let outcome = match self.connect_vpn(&run.config).await {
            Ok(outcome) => outcome,
            Err(e) => return run.fail(backend_failure(e)),
        };
        run.vpn_outcome = Some(outcome.clone());

        match outcome {
            ConnectionOutcome::Connected => {}
            ConnectionOutcome::AlreadyConnected => info!("VPN was already connected"),
            ConnectionOutcome::IncorrectLogin => return run.fail(FailureKind::IncorrectLogin),
            ConnectionOutcome::NoInternet => return run.fail(FailureKind::NoInternet),
            ConnectionOutcome::UnsupportedPlatform(os) => {
                return run.fail(FailureKind::UnsupportedPlatform(os))
            }
            ConnectionOutcome::ProcessFailure(raw) => return run.fail(FailureKind::Fatal(raw)),
        }

        if run.config.only_vpn {
            info!("Skipping remote desktop");
            return run.finish(OrchestratorState::Done);
        }

        let server = run.config.rdp.server.clone();
        run.enter(OrchestratorState::OpeningRemoteDesktop {
            server: server.clone(),
        });
        if let Err(e) = self.rdp.open(&server).await {
            return run.fail(backend_failure(e));
        }

        run.finish(OrchestratorState::Done)
    }

    /// Re-check live status, then connect only if needed
    async fn connect_vpn(&self, config: &SavedConfig) -> Result<ConnectionOutcome, BackendError> {
        match self.vpn.query_status().await {
            Ok(true) => return Ok(ConnectionOutcome::AlreadyConnected),
            Ok(false) => {}
            Err(e) => warn!("VPN status query failed before connecting: {}", e),
        }

        let vpn = &config.vpn;
        self.vpn
            .connect(&vpn.server, &vpn.group, &vpn.username, &vpn.password)
            .await
    }

    /// Platform VPN defaults with the stored group resolved to its number
    async fn vpn_defaults(&self) -> Result<VpnDefaults, DefaultsError> {
        let mut defaults = self.defaults.vpn_defaults().await?;
        let stored_group = defaults.group_name.trim().to_string();

        if stored_group.is_empty() || defaults.server.trim().is_empty() {
            return Ok(defaults);
        }

        match self
            .catalog
            .resolve_name_to_number(&defaults.server, &stored_group)
            .await
        {
            Ok(number) => defaults.group = number,
            Err(BackendError::NoInternet) => return Err(BackendError::NoInternet.into()),
            Err(e) => {
                warn!(group = %stored_group, "Could not resolve default VPN group: {}", e);
                defaults.group_name.clear();
                return Ok(defaults);
            }
        }
        if is_group_number(&stored_group) {
            // Only the number is known; the name comes from setup
            defaults.group_name.clear();
        }
        Ok(defaults)
    }
}

fn backend_failure(error: BackendError) -> FailureKind {
    match error {
        BackendError::NoInternet => FailureKind::NoInternet,
        BackendError::UnsupportedPlatform(os) => FailureKind::UnsupportedPlatform(os),
        BackendError::MissingCredentials { field } => FailureKind::MissingCredentials(field.to_string()),
        other => FailureKind::Fatal(other.to_string()),
    }
}

fn setup_failure(error: SetupError) -> FailureKind {
    match error {
        SetupError::Aborted => FailureKind::SetupAborted,
        SetupError::Backend(e) => backend_failure(e),
        other => FailureKind::Fatal(other.to_string()),
    }
}
