//! Error types for the analytics system

use super::target::Target;

pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// A handler failed to start its backend
    #[error("Handler initialization failed for {target}: {message}")]
    HandlerInit { target: Target, message: String },

    /// A collaborator the handler depends on was not supplied in the context
    #[error("Missing collaborator for {target}: {collaborator} not configured")]
    MissingCollaborator {
        target: Target,
        collaborator: &'static str,
    },

    /// A handler refused or failed to record an event
    #[error("Handler '{handler}' failed to record '{event}': {message}")]
    Record {
        handler: String,
        event: String,
        message: String,
    },

    /// Datagram could not be delivered to the log server
    #[error("Transmission to {host}:{port} failed: {source}")]
    Transmission {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// Partition file operation failed
    #[error("Storage error while {operation} '{partition}': {source}")]
    Storage {
        operation: &'static str,
        partition: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Shipper worker is gone
    #[error("Log shipper already stopped")]
    ShipperStopped,

    /// Channel send error
    #[error("Failed to send command to log shipper worker")]
    ChannelSendError,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl AnalyticsError {
    /// Create a handler initialization error
    pub fn handler_init(target: Target, message: impl Into<String>) -> Self {
        AnalyticsError::HandlerInit {
            target,
            message: message.into(),
        }
    }

    /// Create a missing collaborator error
    pub fn missing_collaborator(target: Target, collaborator: &'static str) -> Self {
        AnalyticsError::MissingCollaborator {
            target,
            collaborator,
        }
    }

    /// Create a record error
    pub fn record(
        handler: impl Into<String>,
        event: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        AnalyticsError::Record {
            handler: handler.into(),
            event: event.into(),
            message: message.into(),
        }
    }

    /// Create a transmission error
    pub fn transmission(host: impl Into<String>, port: u16, source: std::io::Error) -> Self {
        AnalyticsError::Transmission {
            host: host.into(),
            port,
            source,
        }
    }

    /// Create a storage error for a partition operation
    pub fn storage(
        operation: &'static str,
        partition: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        AnalyticsError::Storage {
            operation,
            partition: partition.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        AnalyticsError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        AnalyticsError::Other(msg.into())
    }
}
