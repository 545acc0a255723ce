//! Error types for the kiosk session core

use thiserror::Error;

/// Result type alias for kiosk operations
pub type Result<T> = std::result::Result<T, KioskError>;

/// Errors surfaced by the session state machine and its collaborators
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KioskError {
    /// Local input validation failed, no backend call was made
    #[error("{0}")]
    Validation(String),

    /// The OTP countdown reached zero
    #[error("OTP expired")]
    ChallengeExpired,

    /// Backend rejected the OTP
    #[error("{0}")]
    AuthenticationRejected(String),

    /// Backend could not be reached
    #[error("Transport error: {0}")]
    Transport(String),

    /// Emergency lockdown is active
    #[error("Terminal is in emergency lockdown")]
    LockedDown,

    /// Operation is not valid in the current session state
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// Action is not offered to the current role
    #[error("Action not permitted: {0}")]
    Forbidden(String),

    /// Navigation target could not be parsed
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// Session store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Request or event channel was closed (page torn down)
    #[error("Channel closed")]
    ChannelClosed,
}

impl From<url::ParseError> for KioskError {
    fn from(e: url::ParseError) -> Self {
        KioskError::Navigation(e.to_string())
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for KioskError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        KioskError::ChannelClosed
    }
}
