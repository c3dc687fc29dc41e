use crate::session::state::Mode;
use crate::transport::TransportError;
use thiserror::Error;

/// Errors returned by session operations.
///
/// Runtime transport errors are not part of this type: they only ever show up
/// in the status message of a snapshot.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("Bluetooth permission denied")]
    PermissionDenied,
    #[error("Radio initialization failed: {0}")]
    InitFailure(String),
    #[error("Failed to start transport: {0}")]
    TransportStartFailure(#[from] TransportError),
    #[error("Mode already selected: {0}")]
    ModeAlreadySelected(Mode),
    #[error("Session not initialized")]
    NotInitialized,
    #[error("Session closed")]
    SessionClosed,
}
