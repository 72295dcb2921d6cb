use std::time::Duration;

use event_source::SourceError;
use thiserror::Error;

/// Errors that can occur in the versioned listener
#[derive(Error, Debug)]
pub enum ListenerError {
    /// The event source rejected the subscription made by `start`
    #[error("Listener {tag} failed to subscribe: {source}")]
    SubscriptionFailed {
        tag: String,
        #[source]
        source: SourceError,
    },

    /// The event source reported an error while tearing down a subscription.
    ///
    /// Only ever logged; local state is already invalidated when this occurs.
    #[error("Listener {tag} failed to unsubscribe: {source}")]
    UnsubscribeFailed {
        tag: String,
        #[source]
        source: SourceError,
    },

    /// The execution context has shut down and no longer accepts tasks
    #[error("Execution context {0} is closed")]
    ContextClosed(String),

    /// Tasks were still pending when the idle wait ran out
    #[error("Execution context {context} did not become idle within {timeout:?}")]
    IdleTimeout { context: String, timeout: Duration },

    /// The worker thread terminated by panicking
    #[error("Worker thread {0} panicked")]
    WorkerPanicked(String),

    /// The worker thread or its runtime could not be created
    #[error("Failed to spawn worker thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for listener operations
pub type Result<T> = std::result::Result<T, ListenerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_listener_error_display() {
        let error = ListenerError::SubscriptionFailed {
            tag: "upstream".to_string(),
            source: SourceError::Closed,
        };
        assert_eq!(
            error.to_string(),
            "Listener upstream failed to subscribe: Event source is closed"
        );
        assert!(error.source().is_some());

        let error = ListenerError::ContextClosed("tether-worker".to_string());
        assert_eq!(error.to_string(), "Execution context tether-worker is closed");

        let error = ListenerError::IdleTimeout {
            context: "tether-worker".to_string(),
            timeout: Duration::from_millis(50),
        };
        assert!(error.to_string().contains("50ms"));

        let error = ListenerError::Configuration("empty name".to_string());
        assert_eq!(error.to_string(), "Configuration error: empty name");
    }

    #[test]
    fn test_error_conversion_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "no threads left");
        let error: ListenerError = io.into();

        match error {
            ListenerError::WorkerSpawn(e) => assert_eq!(e.to_string(), "no threads left"),
            _ => panic!("Expected WorkerSpawn variant"),
        }
    }
}
