//! Error types for the event-source crate.

use crate::source::SubscriptionHandle;

/// Errors reported by an [`EventSource`](crate::EventSource).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The event source has been closed and accepts no new subscriptions
    #[error("Event source is closed")]
    Closed,

    /// The handle does not refer to a live subscription
    #[error("Unknown subscription: {0}")]
    UnknownSubscription(SubscriptionHandle),

    /// The transport behind the event source cannot be reached
    #[error("Event source unavailable: {0}")]
    Unavailable(String),
}

/// Convenience type alias for Results using SourceError.
pub type Result<T> = std::result::Result<T, SourceError>;
