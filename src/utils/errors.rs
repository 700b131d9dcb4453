// src/utils/errors.rs
//! Error types for the redirect layer

use thiserror::Error;

/// Boxed error used for transport and body failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while deciding, rebuilding, or dispatching a call
#[derive(Error, Debug)]
pub enum RedirectError {
    /// The call could not be interpreted (bad method, bad header, bad URL)
    #[error("Decision failed: {0}")]
    DecisionFailed(String),

    /// Network-level failure talking to `url`. HTTP error statuses never land here.
    #[error("Dispatch to {url} failed: {source}")]
    DispatchFailed {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The caller's cancellation signal fired before a response arrived
    #[error("Request to {0} aborted")]
    Aborted(String),

    /// A one-shot body stream was already taken by an earlier dispatch
    #[error("Request body already consumed")]
    BodyConsumed,

    #[error("Storage error: {0}")]
    StorageFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Settings panel error: {0}")]
    PanelError(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl RedirectError {
    /// Whether the error came from the network layer (and so qualifies for fallback)
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            RedirectError::DispatchFailed { .. }
                | RedirectError::Aborted(_)
                | RedirectError::BodyConsumed
        )
    }
}

impl From<rusqlite::Error> for RedirectError {
    fn from(e: rusqlite::Error) -> Self {
        RedirectError::StorageFailed(e.to_string())
    }
}

impl From<::config::ConfigError> for RedirectError {
    fn from(e: ::config::ConfigError) -> Self {
        RedirectError::ConfigError(e.to_string())
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, RedirectError>;
