//! Error types for action servers and their transports.

use thiserror::Error;

/// Dynamic error type that can be sent and shared between threads.
pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for oxidros action operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in oxidros action operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Channel closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The action server actor is no longer running
    #[error("Action server has shut down")]
    ServerShutdown,

    /// Invalid action, service or topic name
    #[error("Invalid name '{name}': {reason}")]
    InvalidName {
        /// The invalid name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A request endpoint with this name is already being served
    #[error("Service already exists: {0}")]
    ServiceExists(String),

    /// No endpoint is serving this name
    #[error("Service not available: {0}")]
    ServiceNotAvailable(String),

    /// A response was sent for a request nobody is waiting on
    #[error("No pending request for client {0}")]
    RequestNotFound(String),

    /// Timeout waiting for a response
    #[error("Timeout")]
    Timeout,

    /// YAML parse error
    #[error("YAML error: {0}")]
    Yaml(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
