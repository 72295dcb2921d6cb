//! In-process event routing.
//!
//! This module provides the `LocalEventSource`, which keeps a table of active
//! subscriptions and routes every published event to the handlers whose
//! filters accept it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{Result, SourceError};
use crate::event::{Event, EventFilter};
use crate::source::{DeliveryHandler, EventSource, SubscriptionHandle};

struct Subscriber {
    filter: EventFilter,
    handler: DeliveryHandler,
}

/// Routes published events to subscribed handlers.
///
/// Delivery happens synchronously on the thread calling [`publish`], which
/// plays the role of the transport's delivery thread. Handlers are invoked
/// after the subscription table has been released, so a handler may freely
/// subscribe or unsubscribe.
///
/// Clones share the same subscription table.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use event_source::{Event, EventFilter, EventSource, LocalEventSource};
///
/// let source = LocalEventSource::new();
/// let seen = Arc::new(AtomicUsize::new(0));
///
/// let counter = Arc::clone(&seen);
/// let handle = source
///     .subscribe(
///         &EventFilter::for_action("tether.state_changed"),
///         Arc::new(move |_event: Event| {
///             counter.fetch_add(1, Ordering::SeqCst);
///         }),
///     )
///     .unwrap();
///
/// assert_eq!(source.publish(Event::new("tether.state_changed")), 1);
/// assert_eq!(source.publish(Event::new("wifi.scan_results")), 0);
/// assert_eq!(seen.load(Ordering::SeqCst), 1);
///
/// source.unsubscribe(&handle).unwrap();
/// assert_eq!(source.publish(Event::new("tether.state_changed")), 0);
/// ```
///
/// [`publish`]: LocalEventSource::publish
#[derive(Clone, Default)]
pub struct LocalEventSource {
    subscriptions: Arc<DashMap<SubscriptionHandle, Subscriber>>,
    closed: Arc<AtomicBool>,
}

impl LocalEventSource {
    /// Create a new event source with no subscriptions
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an event to every matching subscription.
    ///
    /// Returns the number of handlers the event was delivered to; always 0
    /// once the source is closed.
    pub fn publish(&self, event: Event) -> usize {
        if self.is_closed() {
            tracing::trace!(action = event.action(), "Event source closed, dropping event");
            return 0;
        }

        // Snapshot matching handlers so no map shard lock is held while they run
        let handlers: Vec<DeliveryHandler> = self
            .subscriptions
            .iter()
            .filter(|entry| entry.value().filter.matches(&event))
            .map(|entry| Arc::clone(&entry.value().handler))
            .collect();

        tracing::trace!(
            action = event.action(),
            receivers = handlers.len(),
            "Publishing event"
        );

        let delivered = handlers.len();
        for handler in handlers {
            handler(event.clone());
        }
        delivered
    }

    /// Close the event source.
    ///
    /// Existing subscriptions are dropped and later calls to `subscribe`
    /// fail with [`SourceError::Closed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        let dropped = self.subscriptions.len();
        self.subscriptions.clear();
        tracing::debug!(dropped, "Event source closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of live subscriptions
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl EventSource for LocalEventSource {
    fn subscribe(
        &self,
        filter: &EventFilter,
        handler: DeliveryHandler,
    ) -> Result<SubscriptionHandle> {
        if self.is_closed() {
            return Err(SourceError::Closed);
        }

        let handle = SubscriptionHandle::new();
        self.subscriptions.insert(
            handle.clone(),
            Subscriber {
                filter: filter.clone(),
                handler,
            },
        );

        // A concurrent close may have cleared the table before this insert
        if self.is_closed() {
            self.subscriptions.remove(&handle);
            return Err(SourceError::Closed);
        }

        tracing::debug!(subscription = %handle, %filter, "Registered subscription");
        Ok(handle)
    }

    fn unsubscribe(&self, handle: &SubscriptionHandle) -> Result<()> {
        match self.subscriptions.remove(handle) {
            Some(_) => {
                tracing::debug!(subscription = %handle, "Removed subscription");
                Ok(())
            }
            None => Err(SourceError::UnknownSubscription(handle.clone())),
        }
    }
}

impl std::fmt::Debug for LocalEventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalEventSource")
            .field("subscription_count", &self.subscriptions.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
