//! Orchestrator flow tests
//!
//! Every collaborator is an in-memory fake that records the calls it sees.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use vrc_core::config::{CredentialStore, MemoryCredentialStore};
use vrc_core::traits::{DefaultsProvider, RdpBackend, VpnBackend};
use vrc_core::{
    BackendError, ConnectionOutcome, DefaultsError, DisconnectOutcome, RdpDefaults, RdpTarget,
    SavedConfig, VpnCredentials, VpnDefaults, VpnGroup,
};
use vrc_orchestrator::{
    check_statuses, disconnect_all, Answer, ConnectionOrchestrator, DisconnectStep, FailureKind,
    FormStep, GroupCatalog, OrchestratorState, RunRequest, SetupAssistant, SetupError, SetupForm,
};

type CallLog = Arc<Mutex<Vec<String>>>;

fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

struct FakeVpn {
    log: CallLog,
    installed: bool,
    unsupported_os: Option<String>,
    statuses: Mutex<VecDeque<bool>>,
    connect_result: Mutex<Option<Result<ConnectionOutcome, BackendError>>>,
    groups: Result<Vec<VpnGroup>, ()>,
    offline: bool,
}

impl FakeVpn {
    fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            installed: true,
            unsupported_os: None,
            statuses: Mutex::new(VecDeque::new()),
            connect_result: Mutex::new(Some(Ok(ConnectionOutcome::Connected))),
            groups: Ok(vec![
                VpnGroup::new("0", "Default"),
                VpnGroup::new("1", "Engineering"),
            ]),
            offline: false,
        }
    }

    /// Status answers in order; once exhausted the VPN reads as disconnected
    fn with_statuses(self, statuses: &[bool]) -> Self {
        *self.statuses.lock().unwrap() = statuses.iter().copied().collect();
        self
    }

    fn with_connect(self, result: Result<ConnectionOutcome, BackendError>) -> Self {
        *self.connect_result.lock().unwrap() = Some(result);
        self
    }
}

#[async_trait]
impl VpnBackend for FakeVpn {
    fn is_installed(&self) -> Result<bool, BackendError> {
        match &self.unsupported_os {
            Some(os) => Err(BackendError::UnsupportedPlatform(os.clone())),
            None => Ok(self.installed),
        }
    }

    async fn connect(
        &self,
        server: &str,
        group: &str,
        username: &str,
        _password: &str,
    ) -> Result<ConnectionOutcome, BackendError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("vpn.connect {} {} {}", server, group, username));
        self.connect_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Ok(ConnectionOutcome::Connected))
    }

    async fn disconnect(&self) -> Result<DisconnectOutcome, BackendError> {
        let mut log = self.log.lock().unwrap();
        let seen_before = log.iter().any(|c| c == "vpn.disconnect");
        log.push("vpn.disconnect".to_string());
        Ok(if seen_before {
            DisconnectOutcome::NotConnected
        } else {
            DisconnectOutcome::Disconnected
        })
    }

    async fn query_status(&self) -> Result<bool, BackendError> {
        self.log.lock().unwrap().push("vpn.status".to_string());
        Ok(self.statuses.lock().unwrap().pop_front().unwrap_or(false))
    }

    async fn list_groups(&self, server: &str) -> Result<Vec<VpnGroup>, BackendError> {
        self.log.lock().unwrap().push(format!("vpn.groups {}", server));
        if self.offline {
            return Err(BackendError::NoInternet);
        }
        self.groups
            .clone()
            .map_err(|_| BackendError::ProcessFailure("listing failed".into()))
    }
}

struct FakeRdp {
    log: CallLog,
    open: bool,
}

#[async_trait]
impl RdpBackend for FakeRdp {
    async fn open(&self, server: &str) -> Result<(), BackendError> {
        self.log.lock().unwrap().push(format!("rdp.open {}", server));
        Ok(())
    }

    async fn close(&self) -> Result<(), BackendError> {
        self.log.lock().unwrap().push("rdp.close".to_string());
        Ok(())
    }

    async fn is_open(&self) -> Result<bool, BackendError> {
        self.log.lock().unwrap().push("rdp.is_open".to_string());
        Ok(self.open)
    }
}

#[derive(Default)]
struct FakeDefaults {
    vpn: VpnDefaults,
    rdp: RdpDefaults,
    vpn_calls: Mutex<usize>,
    rdp_calls: Mutex<usize>,
}

#[async_trait]
impl DefaultsProvider for FakeDefaults {
    async fn vpn_defaults(&self) -> Result<VpnDefaults, DefaultsError> {
        *self.vpn_calls.lock().unwrap() += 1;
        Ok(self.vpn.clone())
    }

    async fn rdp_defaults(&self) -> Result<RdpDefaults, DefaultsError> {
        *self.rdp_calls.lock().unwrap() += 1;
        if self.rdp.server.is_empty() {
            return Err(DefaultsError::Unavailable {
                path: "bookmarks".into(),
                reason: "no database".into(),
            });
        }
        Ok(self.rdp.clone())
    }
}

/// Answers the wizard from a fixed list; running out of answers aborts
struct ScriptedAssistant {
    answers: VecDeque<Answer>,
    abort: bool,
    runs: usize,
    seen_defaults: Option<SavedConfig>,
}

impl ScriptedAssistant {
    fn answering(answers: Vec<Answer>) -> Self {
        Self {
            answers: answers.into(),
            abort: false,
            runs: 0,
            seen_defaults: None,
        }
    }

    fn aborting() -> Self {
        Self {
            abort: true,
            ..Self::answering(Vec::new())
        }
    }

    fn unused() -> Self {
        Self::answering(Vec::new())
    }
}

#[async_trait]
impl SetupAssistant for ScriptedAssistant {
    async fn run_setup(
        &mut self,
        mut form: SetupForm,
        catalog: &GroupCatalog,
    ) -> Result<SavedConfig, SetupError> {
        self.runs += 1;
        self.seen_defaults = Some(form.config().clone());
        if self.abort {
            return Err(SetupError::Aborted);
        }

        loop {
            if let Some(server) = form.groups_needed().map(str::to_string) {
                let groups = catalog.list(&server).await?;
                form.set_groups(&server, groups);
            }
            let answer = self.answers.pop_front().ok_or(SetupError::Aborted)?;
            if let FormStep::Completed(config) = form.submit(answer)? {
                return Ok(config);
            }
        }
    }
}

fn complete_config(only_vpn: bool) -> SavedConfig {
    SavedConfig {
        vpn: VpnCredentials {
            server: "example-server".into(),
            group: "1".into(),
            group_name: "Engineering".into(),
            username: "knut".into(),
            password: "supersecret".into(),
        },
        rdp: RdpTarget {
            server: "desk-042".into(),
        },
        only_vpn,
    }
}

struct Harness {
    log: CallLog,
    store: Arc<MemoryCredentialStore>,
    defaults: Arc<FakeDefaults>,
    orchestrator: ConnectionOrchestrator,
}

fn harness(vpn: FakeVpn, log: CallLog, store: MemoryCredentialStore, defaults: FakeDefaults) -> Harness {
    let store = Arc::new(store);
    let defaults = Arc::new(defaults);
    let orchestrator = ConnectionOrchestrator::new(
        Arc::new(vpn),
        Arc::new(FakeRdp {
            log: log.clone(),
            open: false,
        }),
        store.clone(),
        defaults.clone(),
    );
    Harness {
        log,
        store,
        defaults,
        orchestrator,
    }
}

fn is_connecting(state: &OrchestratorState) -> bool {
    matches!(state, OrchestratorState::ConnectingVpn { .. })
}

#[tokio::test]
async fn test_complete_store_and_connected_vpn_opens_remote_desktop() {
    let log = CallLog::default();
    let vpn = FakeVpn::new(&log).with_statuses(&[true, true]);
    let store = MemoryCredentialStore::with_config(&complete_config(false)).unwrap();
    let h = harness(vpn, log, store, FakeDefaults::default());

    let mut assistant = ScriptedAssistant::unused();
    let report = h.orchestrator.run(RunRequest::default(), &mut assistant).await;

    assert!(report.is_done());
    assert_eq!(assistant.runs, 0);
    assert_eq!(report.vpn_outcome, Some(ConnectionOutcome::AlreadyConnected));
    assert!(!calls(&h.log).iter().any(|c| c.starts_with("vpn.connect")));
    assert_eq!(calls(&h.log).last().map(String::as_str), Some("rdp.open desk-042"));
    // Connected VPN skips the VPN defaults
    assert_eq!(*h.defaults.vpn_calls.lock().unwrap(), 0);

    assert_eq!(
        report.transitions,
        vec![
            OrchestratorState::CheckingInstallation,
            OrchestratorState::LoadingDefaults,
            OrchestratorState::LoadedFromStore,
            OrchestratorState::ConnectingVpn {
                group_name: "Engineering".into()
            },
            OrchestratorState::OpeningRemoteDesktop {
                server: "desk-042".into()
            },
            OrchestratorState::Done,
        ]
    );
}

#[tokio::test]
async fn test_complete_store_connects_then_opens() {
    let log = CallLog::default();
    let vpn = FakeVpn::new(&log);
    let store = MemoryCredentialStore::with_config(&complete_config(false)).unwrap();
    let h = harness(vpn, log, store, FakeDefaults::default());

    let report = h
        .orchestrator
        .run(RunRequest::default(), &mut ScriptedAssistant::unused())
        .await;

    assert!(report.is_done());
    let log = calls(&h.log);
    let connect = log.iter().position(|c| c == "vpn.connect example-server 1 knut");
    let open = log.iter().position(|c| c == "rdp.open desk-042");
    assert!(connect.is_some() && open.is_some());
    assert!(connect < open);
    assert_eq!(h.store.save_count(), 0);
}

#[tokio::test]
async fn test_remote_desktop_only_follows_positive_outcome() {
    let outcomes = vec![
        Ok(ConnectionOutcome::Connected),
        Ok(ConnectionOutcome::AlreadyConnected),
        Ok(ConnectionOutcome::IncorrectLogin),
        Ok(ConnectionOutcome::NoInternet),
        Ok(ConnectionOutcome::ProcessFailure("boom".into())),
        Err(BackendError::MissingCredentials { field: "password" }),
    ];

    for outcome in outcomes {
        let positive = matches!(
            outcome,
            Ok(ConnectionOutcome::Connected | ConnectionOutcome::AlreadyConnected)
        );
        let log = CallLog::default();
        let vpn = FakeVpn::new(&log).with_connect(outcome);
        let store = MemoryCredentialStore::with_config(&complete_config(false)).unwrap();
        let h = harness(vpn, log, store, FakeDefaults::default());

        let report = h
            .orchestrator
            .run(RunRequest::default(), &mut ScriptedAssistant::unused())
            .await;

        let opening = report
            .transitions
            .iter()
            .position(|s| matches!(s, OrchestratorState::OpeningRemoteDesktop { .. }));
        match opening {
            Some(index) => {
                assert!(positive);
                assert!(is_connecting(&report.transitions[index - 1]));
                assert!(report.vpn_outcome.as_ref().is_some_and(ConnectionOutcome::is_positive));
            }
            None => {
                assert!(!positive);
                assert!(!calls(&h.log).iter().any(|c| c.starts_with("rdp.open")));
            }
        }
    }
}

#[tokio::test]
async fn test_incorrect_login_fails_with_suggestion() {
    let log = CallLog::default();
    let vpn = FakeVpn::new(&log).with_connect(Ok(ConnectionOutcome::IncorrectLogin));
    let store = MemoryCredentialStore::with_config(&complete_config(false)).unwrap();
    let h = harness(vpn, log, store, FakeDefaults::default());

    let report = h
        .orchestrator
        .run(RunRequest::default(), &mut ScriptedAssistant::unused())
        .await;

    assert_eq!(report.failure(), Some(&FailureKind::IncorrectLogin));
    assert!(report.failure().unwrap().suggestion().is_some());
}

#[tokio::test]
async fn test_process_failure_is_fatal_with_raw_text() {
    let log = CallLog::default();
    let vpn = FakeVpn::new(&log).with_connect(Ok(ConnectionOutcome::ProcessFailure(
        ">> error: The VPN service is not available.".into(),
    )));
    let store = MemoryCredentialStore::with_config(&complete_config(false)).unwrap();
    let h = harness(vpn, log, store, FakeDefaults::default());

    let report = h
        .orchestrator
        .run(RunRequest::default(), &mut ScriptedAssistant::unused())
        .await;

    assert!(matches!(report.failure(), Some(FailureKind::Fatal(raw)) if raw.contains("not available")));
}

#[tokio::test]
async fn test_not_installed_stops_immediately() {
    let log = CallLog::default();
    let vpn = FakeVpn {
        installed: false,
        ..FakeVpn::new(&log)
    };
    let h = harness(vpn, log, MemoryCredentialStore::new(), FakeDefaults::default());

    let report = h
        .orchestrator
        .run(RunRequest::default(), &mut ScriptedAssistant::unused())
        .await;

    assert_eq!(
        report.transitions,
        vec![
            OrchestratorState::CheckingInstallation,
            OrchestratorState::Failed(FailureKind::NotInstalled),
        ]
    );
    assert!(calls(&h.log).is_empty());
}

#[tokio::test]
async fn test_unsupported_platform_is_reported_as_such() {
    let log = CallLog::default();
    let vpn = FakeVpn {
        unsupported_os: Some("linux".into()),
        ..FakeVpn::new(&log)
    };
    let h = harness(vpn, log, MemoryCredentialStore::new(), FakeDefaults::default());

    let report = h
        .orchestrator
        .run(RunRequest::default(), &mut ScriptedAssistant::unused())
        .await;

    assert_eq!(
        report.transitions,
        vec![
            OrchestratorState::CheckingInstallation,
            OrchestratorState::Failed(FailureKind::UnsupportedPlatform("linux".into())),
        ]
    );
    assert!(calls(&h.log).is_empty());
}

#[tokio::test]
async fn test_connected_vpn_with_incomplete_store_skips_setup() {
    let log = CallLog::default();
    let vpn = FakeVpn::new(&log).with_statuses(&[true, true]);
    let partial = SavedConfig {
        rdp: RdpTarget {
            server: "desk-042".into(),
        },
        ..Default::default()
    };
    let store = MemoryCredentialStore::with_config(&partial).unwrap();
    let h = harness(vpn, log, store, FakeDefaults::default());

    let mut assistant = ScriptedAssistant::unused();
    let report = h.orchestrator.run(RunRequest::default(), &mut assistant).await;

    assert!(report.is_done());
    assert_eq!(assistant.runs, 0);
    assert_eq!(h.store.save_count(), 0);
    assert_eq!(report.vpn_outcome, Some(ConnectionOutcome::AlreadyConnected));
    assert!(!report.transitions.contains(&OrchestratorState::SettingUp));
    assert!(report.transitions.contains(&OrchestratorState::LoadedFromStore));
    assert!(!calls(&h.log).iter().any(|c| c.starts_with("vpn.connect")));
    assert_eq!(calls(&h.log).last().map(String::as_str), Some("rdp.open desk-042"));
}

#[tokio::test]
async fn test_no_internet_while_resolving_defaults() {
    let log = CallLog::default();
    let vpn = FakeVpn {
        offline: true,
        ..FakeVpn::new(&log)
    };
    let defaults = FakeDefaults {
        vpn: VpnDefaults {
            server: "example-server".into(),
            group_name: "Engineering".into(),
            ..Default::default()
        },
        ..Default::default()
    };
    let h = harness(vpn, log, MemoryCredentialStore::new(), defaults);

    let mut assistant = ScriptedAssistant::unused();
    let report = h.orchestrator.run(RunRequest::default(), &mut assistant).await;

    assert_eq!(report.failure(), Some(&FailureKind::NoInternet));
    assert_eq!(assistant.runs, 0);
    assert!(!report.transitions.contains(&OrchestratorState::SettingUp));
}

#[tokio::test]
async fn test_incomplete_store_runs_setup_and_saves_once() {
    let log = CallLog::default();
    let vpn = FakeVpn::new(&log);
    let defaults = FakeDefaults {
        vpn: VpnDefaults {
            server: "example-server".into(),
            group_name: "Engineering".into(),
            username: "knut".into(),
            ..Default::default()
        },
        rdp: RdpDefaults {
            server: "desk-042".into(),
        },
        ..Default::default()
    };
    let h = harness(vpn, log, MemoryCredentialStore::new(), defaults);

    let mut assistant = ScriptedAssistant::answering(vec![
        Answer::Text("example-server".into()),
        Answer::Choice(1),
        Answer::Text("knut".into()),
        Answer::Text("supersecret".into()),
        Answer::Text("desk-042".into()),
        Answer::Choice(0),
    ]);
    let report = h.orchestrator.run(RunRequest::default(), &mut assistant).await;

    assert!(report.is_done());
    assert_eq!(assistant.runs, 1);

    // Defaults were resolved and offered to the wizard
    let offered = assistant.seen_defaults.unwrap();
    assert_eq!(offered.vpn.server, "example-server");
    assert_eq!(offered.vpn.group, "1");
    assert_eq!(offered.rdp.server, "desk-042");

    assert_eq!(h.store.save_count(), 1);
    assert_eq!(h.store.load().unwrap(), Some(complete_config(false)));
    assert!(calls(&h.log).contains(&"vpn.connect example-server 1 knut".to_string()));
    assert!(report.transitions.contains(&OrchestratorState::SettingUp));
}

#[tokio::test]
async fn test_setup_requested_with_complete_store() {
    let log = CallLog::default();
    let vpn = FakeVpn::new(&log);
    let store = MemoryCredentialStore::with_config(&complete_config(false)).unwrap();
    let h = harness(vpn, log, store, FakeDefaults::default());

    let mut assistant = ScriptedAssistant::answering(vec![
        Answer::Text("example-server".into()),
        Answer::Choice(0),
        Answer::Text("knut".into()),
        Answer::Text("supersecret".into()),
        Answer::Text("desk-042".into()),
        Answer::Choice(1),
    ]);
    let request = RunRequest {
        setup: true,
        only_vpn: false,
    };
    let report = h.orchestrator.run(request, &mut assistant).await;

    assert!(report.is_done());
    assert!(report.only_vpn);
    let saved = h.store.load().unwrap().unwrap();
    assert_eq!(saved.vpn.group_name, "Default");
    assert!(saved.only_vpn);
    assert!(!calls(&h.log).iter().any(|c| c.starts_with("rdp.open")));
}

#[tokio::test]
async fn test_setup_abort_saves_nothing() {
    let log = CallLog::default();
    let vpn = FakeVpn::new(&log);
    let h = harness(vpn, log, MemoryCredentialStore::new(), FakeDefaults::default());

    let report = h
        .orchestrator
        .run(RunRequest::default(), &mut ScriptedAssistant::aborting())
        .await;

    assert_eq!(report.failure(), Some(&FailureKind::SetupAborted));
    assert_eq!(h.store.save_count(), 0);
    assert!(!calls(&h.log).iter().any(|c| c.starts_with("vpn.connect")));
}

#[tokio::test]
async fn test_only_vpn_flag_skips_remote_desktop_and_its_defaults() {
    let log = CallLog::default();
    let vpn = FakeVpn::new(&log);
    let store = MemoryCredentialStore::with_config(&complete_config(false)).unwrap();
    let h = harness(vpn, log, store, FakeDefaults::default());

    let request = RunRequest {
        setup: false,
        only_vpn: true,
    };
    let report = h
        .orchestrator
        .run(request, &mut ScriptedAssistant::unused())
        .await;

    assert!(report.is_done());
    assert_eq!(*h.defaults.rdp_calls.lock().unwrap(), 0);
    assert!(is_connecting(&report.transitions[report.transitions.len() - 2]));
}

#[tokio::test]
async fn test_persisted_values_win_over_defaults() {
    let log = CallLog::default();
    let vpn = FakeVpn::new(&log);
    let store = MemoryCredentialStore::with_config(&complete_config(false)).unwrap();
    let defaults = FakeDefaults {
        vpn: VpnDefaults {
            server: "other-server".into(),
            group_name: "0".into(),
            username: "someone-else".into(),
            ..Default::default()
        },
        rdp: RdpDefaults {
            server: "other-desk".into(),
        },
        ..Default::default()
    };
    let h = harness(vpn, log, store, defaults);

    let report = h
        .orchestrator
        .run(RunRequest::default(), &mut ScriptedAssistant::unused())
        .await;

    assert_eq!(report.config, complete_config(false));
    assert!(calls(&h.log).contains(&"rdp.open desk-042".to_string()));
}

#[tokio::test]
async fn test_progress_events_mirror_transitions() {
    let log = CallLog::default();
    let vpn = FakeVpn::new(&log);
    let store = MemoryCredentialStore::with_config(&complete_config(true)).unwrap();
    let h = harness(vpn, log, store, FakeDefaults::default());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let orchestrator = h.orchestrator.with_events(tx);
    let report = orchestrator
        .run(RunRequest::default(), &mut ScriptedAssistant::unused())
        .await;
    drop(orchestrator);

    let mut events = Vec::new();
    while let Some(state) = rx.recv().await {
        events.push(state);
    }
    assert_eq!(events, report.transitions);
}

#[tokio::test]
async fn test_disconnect_all_closes_remote_desktop_first() {
    let log = CallLog::default();
    let vpn = FakeVpn::new(&log);
    let rdp = FakeRdp {
        log: log.clone(),
        open: true,
    };

    let mut steps = Vec::new();
    let first = disconnect_all(&vpn, &rdp, |step| steps.push(step)).await.unwrap();
    assert_eq!(first, DisconnectOutcome::Disconnected);
    assert_eq!(calls(&log), vec!["rdp.close", "vpn.disconnect"]);
    assert_eq!(steps.first(), Some(&DisconnectStep::ClosingRemoteDesktop));

    // Second disconnect observes "not connected" and still succeeds
    let second = disconnect_all(&vpn, &rdp, |_| {}).await.unwrap();
    assert_eq!(second, DisconnectOutcome::NotConnected);
}

#[tokio::test]
async fn test_check_statuses() {
    let log = CallLog::default();
    let vpn = FakeVpn::new(&log).with_statuses(&[true]);
    let rdp = FakeRdp {
        log: log.clone(),
        open: true,
    };
    let store = MemoryCredentialStore::with_config(&complete_config(false)).unwrap();

    let report = check_statuses(&vpn, &rdp, &store, false).await;
    assert!(report.vpn_connected);
    assert_eq!(report.group_name.as_deref(), Some("Engineering"));
    assert_eq!(report.rdp_open, Some(true));

    let report = check_statuses(&vpn, &rdp, &store, true).await;
    assert!(!report.vpn_connected);
    assert_eq!(report.group_name, None);
    assert_eq!(report.rdp_open, None);
}
