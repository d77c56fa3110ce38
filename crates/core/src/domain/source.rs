//! Action producers
//!
//! Hotkey taps, UI controls and the like run on their own threads and hand
//! actions to the controller through a single-consumer channel.

use crate::domain::action::Action;
use crossbeam_channel::Sender;
use thiserror::Error;

/// Message surfaced in the session when a source lacks its permission grant
pub const MISSING_PERMISSION: &str = "Missing permission";

#[derive(Debug, Error)]
pub enum SourceError {
    /// The platform refused to attach the source (e.g. no accessibility grant)
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Failed to start action source: {0}")]
    StartFailed(String),
}

impl SourceError {
    /// Action that reports this failure in the session state
    ///
    /// Permission failures use the fixed user-facing message.
    pub fn to_action(&self) -> Action {
        match self {
            SourceError::PermissionDenied(_) => Action::SetError(Some(MISSING_PERMISSION.to_string())),
            SourceError::StartFailed(reason) => Action::SetError(Some(reason.clone())),
        }
    }
}

/// Something that produces actions on its own thread
pub trait ActionSource {
    /// Begin producing into `sink`; returns once the source is attached
    fn start(&mut self, sink: Sender<Action>) -> Result<(), SourceError>;
}
