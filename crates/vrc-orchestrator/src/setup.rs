//! Interactive setup
//!
//! [`SetupForm`] is the wizard's state machine: an ordered list of fields, the
//! current position, and a back transition. Whatever renders it implements
//! [`SetupAssistant`] and hands the completed record back to the orchestrator.

use async_trait::async_trait;
use thiserror::Error;
use vrc_core::{BackendError, SavedConfig, VpnGroup};

use crate::groups::GroupCatalog;

/// Errors that end a setup without a result
#[derive(Error, Debug)]
pub enum SetupError {
    /// The user left the wizard
    #[error("Setup aborted")]
    Aborted,

    /// The answer does not fit the current field
    #[error("{0:?} expects a different kind of answer")]
    UnexpectedAnswer(SetupField),

    /// A choice index past the end of the list
    #[error("Choice {index} is out of range")]
    ChoiceOutOfRange { index: usize },

    /// Listing groups failed
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Terminal I/O failed
    #[error("Terminal error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wizard fields, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    VpnServer,
    Group,
    Username,
    Password,
    RdpServer,
    OnlyVpn,
}

impl SetupField {
    pub const ALL: [SetupField; 6] = [
        SetupField::VpnServer,
        SetupField::Group,
        SetupField::Username,
        SetupField::Password,
        SetupField::RdpServer,
        SetupField::OnlyVpn,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::VpnServer => "VPN server",
            Self::Group => "Group",
            Self::Username => "Username",
            Self::Password => "Password",
            Self::RdpServer => "RDP server",
            Self::OnlyVpn => "Only connect to VPN",
        }
    }

    /// Free text, as opposed to a choice from a list
    pub fn is_text(self) -> bool {
        !matches!(self, Self::Group | Self::OnlyVpn)
    }

    /// Input is echoed as `*`
    pub fn is_masked(self) -> bool {
        self == Self::Password
    }
}

/// Options of the only-VPN choice
pub const ONLY_VPN_CHOICES: [&str; 2] = ["No", "Yes"];

/// An answer to the current field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    /// Index into the group list or [`ONLY_VPN_CHOICES`]
    Choice(usize),
}

/// What follows a submitted answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStep {
    Field(SetupField),
    Completed(SavedConfig),
}

/// The wizard state machine
#[derive(Debug, Clone)]
pub struct SetupForm {
    config: SavedConfig,
    index: usize,
    groups: Vec<VpnGroup>,
    groups_server: Option<String>,
}

impl SetupForm {
    /// Start at the first field, pre-filled from `defaults`
    pub fn new(defaults: SavedConfig) -> Self {
        Self {
            config: defaults,
            index: 0,
            groups: Vec::new(),
            groups_server: None,
        }
    }

    pub fn current(&self) -> SetupField {
        SetupField::ALL[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn config(&self) -> &SavedConfig {
        &self.config
    }

    pub fn groups(&self) -> &[VpnGroup] {
        &self.groups
    }

    /// Server whose groups must be listed before the group field can show
    pub fn groups_needed(&self) -> Option<&str> {
        let server = self.config.vpn.server.as_str();
        (self.current() == SetupField::Group && self.groups_server.as_deref() != Some(server))
            .then_some(server)
    }

    /// Provide the group listing for `server`
    pub fn set_groups(&mut self, server: &str, groups: Vec<VpnGroup>) {
        self.groups = groups;
        self.groups_server = Some(server.to_string());
    }

    /// Pre-filled text of a text field
    pub fn default_text(&self, field: SetupField) -> &str {
        match field {
            SetupField::VpnServer => &self.config.vpn.server,
            SetupField::Username => &self.config.vpn.username,
            SetupField::Password => &self.config.vpn.password,
            SetupField::RdpServer => &self.config.rdp.server,
            SetupField::Group | SetupField::OnlyVpn => "",
        }
    }

    /// Initially highlighted option of a choice field
    pub fn initial_choice(&self, field: SetupField) -> usize {
        match field {
            SetupField::Group => {
                let group = self.config.vpn.group.trim();
                self.groups
                    .iter()
                    .position(|g| g.number == group)
                    .unwrap_or_else(|| {
                        group
                            .parse::<usize>()
                            .unwrap_or(0)
                            .min(self.groups.len().saturating_sub(1))
                    })
            }
            SetupField::OnlyVpn => usize::from(self.config.only_vpn),
            _ => 0,
        }
    }

    /// Record an answer for the current field and advance
    pub fn submit(&mut self, answer: Answer) -> Result<FormStep, SetupError> {
        let field = self.current();
        match (field, answer) {
            (SetupField::VpnServer, Answer::Text(text)) => self.config.vpn.server = text.trim().to_string(),
            (SetupField::Username, Answer::Text(text)) => self.config.vpn.username = text.trim().to_string(),
            (SetupField::Password, Answer::Text(text)) => self.config.vpn.password = text,
            (SetupField::RdpServer, Answer::Text(text)) => self.config.rdp.server = text.trim().to_string(),
            (SetupField::Group, Answer::Choice(index)) => {
                let group = self
                    .groups
                    .get(index)
                    .ok_or(SetupError::ChoiceOutOfRange { index })?;
                self.config.vpn.group = group.number.clone();
                self.config.vpn.group_name = group.name.clone();
            }
            (SetupField::OnlyVpn, Answer::Choice(index)) => {
                if index >= ONLY_VPN_CHOICES.len() {
                    return Err(SetupError::ChoiceOutOfRange { index });
                }
                self.config.only_vpn = index == 1;
                return Ok(FormStep::Completed(self.config.clone()));
            }
            (field, _) => return Err(SetupError::UnexpectedAnswer(field)),
        }

        self.index += 1;
        Ok(FormStep::Field(self.current()))
    }

    /// Return to the previous field; `false` on the first one
    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }
}

/// Renders a [`SetupForm`] and collects the answers
#[async_trait]
pub trait SetupAssistant: Send {
    /// Run the wizard to completion
    async fn run_setup(
        &mut self,
        form: SetupForm,
        catalog: &GroupCatalog,
    ) -> Result<SavedConfig, SetupError>;
}
