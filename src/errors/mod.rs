//! Error handling module for the roster client.
//!
//! Every failure surfaces to the embedding layer as one `RosterError` with a stable code and a
//! single human-readable message.

use std::fmt;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
    pub const TRANSPORT_ERROR: &str = "TRANSPORT_ERROR";
    pub const API_ERROR: &str = "API_ERROR";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
    pub const LOAD_FAILED: &str = "LOAD_FAILED";
    pub const SAVE_FAILED: &str = "SAVE_FAILED";
    pub const PRECONDITION: &str = "PRECONDITION";
    pub const SAVE_IN_PROGRESS: &str = "SAVE_IN_PROGRESS";
    pub const NOT_LOADED: &str = "NOT_LOADED";
    pub const PANEL_CLOSED: &str = "PANEL_CLOSED";
}

/// The batch phase a save failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePhase {
    Add,
    Remove,
    AssignLeader,
}

impl SavePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SavePhase::Add => "add members",
            SavePhase::Remove => "remove members",
            SavePhase::AssignLeader => "assign leader",
        }
    }
}

/// Roster client error type.
#[derive(Debug)]
pub enum RosterError {
    /// Invalid configuration value
    Config(String),
    /// The request never produced a response (connect, timeout, body read)
    Transport(String),
    /// The collaborator answered with a non-success status
    Api { status: u16, message: String },
    /// A response body could not be decoded into the expected shape
    Decode(String),
    /// The roster could not be loaded; nothing was populated
    Load(String),
    /// A batch phase failed; staged changes are preserved
    Save { phase: SavePhase, message: String },
    /// Caller staged something the current projection does not allow
    Precondition(String),
    /// A save is already running for this panel
    SaveInProgress,
    /// The roster has not been loaded yet
    NotLoaded,
    /// The panel is not open
    PanelClosed,
}

impl RosterError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            RosterError::Config(_) => codes::CONFIG_ERROR,
            RosterError::Transport(_) => codes::TRANSPORT_ERROR,
            RosterError::Api { .. } => codes::API_ERROR,
            RosterError::Decode(_) => codes::DECODE_ERROR,
            RosterError::Load(_) => codes::LOAD_FAILED,
            RosterError::Save { .. } => codes::SAVE_FAILED,
            RosterError::Precondition(_) => codes::PRECONDITION,
            RosterError::SaveInProgress => codes::SAVE_IN_PROGRESS,
            RosterError::NotLoaded => codes::NOT_LOADED,
            RosterError::PanelClosed => codes::PANEL_CLOSED,
        }
    }

    /// Get the user-visible message.
    pub fn message(&self) -> String {
        match self {
            RosterError::Config(msg) => msg.clone(),
            RosterError::Transport(msg) => msg.clone(),
            RosterError::Api { message, .. } => message.clone(),
            RosterError::Decode(msg) => msg.clone(),
            RosterError::Load(msg) => msg.clone(),
            RosterError::Save { phase, message } => {
                format!("Failed to {}: {}", phase.as_str(), message)
            }
            RosterError::Precondition(msg) => msg.clone(),
            RosterError::SaveInProgress => "A save is already in progress".to_string(),
            RosterError::NotLoaded => "The team roster has not been loaded".to_string(),
            RosterError::PanelClosed => "The team panel is not open".to_string(),
        }
    }

    /// Wrap a collaborator error as a failure of the given batch phase.
    pub fn in_phase(self, phase: SavePhase) -> Self {
        match self {
            err @ RosterError::Save { .. } => err,
            other => RosterError::Save {
                phase,
                message: other.message(),
            },
        }
    }
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for RosterError {}

impl From<reqwest::Error> for RosterError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("Transport error: {:?}", err);
        if err.is_decode() {
            RosterError::Decode(format!("Invalid response body: {}", err))
        } else {
            RosterError::Transport(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for RosterError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        RosterError::Decode(format!("JSON error: {}", err))
    }
}
