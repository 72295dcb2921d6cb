//! The contract between an event source and its subscribers.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::Result;
use crate::event::{Event, EventFilter};

/// Entry point invoked by an event source for every matching event.
///
/// The handler runs on the event source's own thread, so implementations
/// should hand the event off to their own execution context instead of doing
/// work inline.
pub type DeliveryHandler = Arc<dyn Fn(Event) + Send + Sync>;

/// Opaque identifier for a live subscription
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(Uuid);

impl SubscriptionHandle {
    /// Generate a fresh, unique handle
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SubscriptionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A publish/subscribe transport.
///
/// Both methods are synchronous with respect to registration: once
/// `subscribe` returns, matching events start flowing to the handler, and once
/// `unsubscribe` returns, no new deliveries are started. Deliveries already in
/// progress may still complete after `unsubscribe` returns.
pub trait EventSource: Send + Sync {
    /// Register `handler` for every event accepted by `filter`
    fn subscribe(&self, filter: &EventFilter, handler: DeliveryHandler)
        -> Result<SubscriptionHandle>;

    /// Tear down a subscription previously returned by `subscribe`
    fn unsubscribe(&self, handle: &SubscriptionHandle) -> Result<()>;
}

impl<S: EventSource + ?Sized> EventSource for Arc<S> {
    fn subscribe(
        &self,
        filter: &EventFilter,
        handler: DeliveryHandler,
    ) -> Result<SubscriptionHandle> {
        (**self).subscribe(filter, handler)
    }

    fn unsubscribe(&self, handle: &SubscriptionHandle) -> Result<()> {
        (**self).unsubscribe(handle)
    }
}
