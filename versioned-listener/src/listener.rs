//! Generation-gated event listener
//!
//! A [`VersionedListener`] subscribes to an [`EventSource`] and forwards
//! matching events to a single callback, but only while it is listening.
//!
//! Events reach the callback in two hops: the event source invokes a delivery
//! handler on its own thread, and that handler posts the event onto the
//! listener's [`ExecutionContext`]. Between the two hops a `stop` (and even a
//! subsequent `start`) may run on the control thread. To reject events that
//! were already in flight, every subscription is tagged with the generation
//! it was created under, and the worker compares that tag against the
//! listener's current generation before calling back. `start` and `stop` each
//! advance the generation, so a stale event can never match again.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use event_source::{DeliveryHandler, Event, EventFilter, EventSource, SubscriptionHandle};
use parking_lot::Mutex;

use crate::error::{ListenerError, Result};
use crate::worker::ExecutionContext;

/// Callback invoked on the execution context for each accepted event
pub type ListenerCallback = Arc<dyn Fn(Event) + Send + Sync>;

/// The subscription held while the listener is active
#[derive(Debug)]
struct ActiveSubscription {
    handle: SubscriptionHandle,
    generation: u64,
}

/// Listener whose callbacks fire if and only if it is listening
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use event_source::{Event, EventFilter, LocalEventSource};
/// use versioned_listener::{VersionedListener, WorkerThread};
///
/// let worker = WorkerThread::named("tether-example").unwrap();
/// let source = Arc::new(LocalEventSource::new());
/// let count = Arc::new(AtomicUsize::new(0));
///
/// let counter = Arc::clone(&count);
/// let listener = VersionedListener::new(
///     "upstream",
///     worker.context(),
///     source.clone(),
///     EventFilter::for_action("tether.upstream_changed"),
///     move |_event| {
///         counter.fetch_add(1, Ordering::SeqCst);
///     },
/// );
///
/// source.publish(Event::new("tether.upstream_changed"));
/// worker.wait_for_idle().unwrap();
/// assert_eq!(count.load(Ordering::SeqCst), 0);
///
/// listener.start().unwrap();
/// source.publish(Event::new("tether.upstream_changed"));
/// worker.wait_for_idle().unwrap();
/// assert_eq!(count.load(Ordering::SeqCst), 1);
///
/// listener.stop();
/// source.publish(Event::new("tether.upstream_changed"));
/// worker.wait_for_idle().unwrap();
/// assert_eq!(count.load(Ordering::SeqCst), 1);
/// ```
pub struct VersionedListener {
    /// Diagnostic label, no behavioral effect
    tag: Arc<str>,

    /// Where gating and callbacks run
    context: ExecutionContext,

    source: Arc<dyn EventSource>,

    filter: EventFilter,

    callback: ListenerCallback,

    /// Bumped by every `start` that tries to subscribe and every effective `stop`
    generation: Arc<AtomicU64>,

    /// Present iff the listener is started
    active: Mutex<Option<ActiveSubscription>>,
}

impl VersionedListener {
    /// Create an idle listener
    ///
    /// Nothing is subscribed until [`start`](VersionedListener::start) is called.
    pub fn new<F>(
        tag: impl Into<String>,
        context: ExecutionContext,
        source: Arc<dyn EventSource>,
        filter: EventFilter,
        callback: F,
    ) -> Self
    where
        F: Fn(Event) + Send + Sync + 'static,
    {
        Self {
            tag: Arc::from(tag.into()),
            context,
            source,
            filter,
            callback: Arc::new(callback),
            generation: Arc::new(AtomicU64::new(0)),
            active: Mutex::new(None),
        }
    }

    /// Start listening
    ///
    /// Calling `start` on a listener that is already listening does nothing:
    /// the existing subscription and generation are kept.
    ///
    /// Fails with [`ListenerError::SubscriptionFailed`] if the event source
    /// rejects the subscription, in which case the listener stays idle. The
    /// generation has still advanced, so a retry subscribes under a fresh one.
    pub fn start(&self) -> Result<()> {
        let mut active = self.active.lock();

        if let Some(current) = active.as_ref() {
            tracing::debug!(
                tag = %self.tag,
                generation = current.generation,
                "Listener already started, ignoring start"
            );
            return Ok(());
        }

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let handler = self.delivery_handler(generation);

        match self.source.subscribe(&self.filter, handler) {
            Ok(handle) => {
                tracing::info!(
                    tag = %self.tag,
                    generation,
                    subscription = %handle,
                    filter = %self.filter,
                    "Listener started"
                );
                *active = Some(ActiveSubscription { handle, generation });
                Ok(())
            }
            Err(source) => {
                let error = ListenerError::SubscriptionFailed {
                    tag: self.tag.to_string(),
                    source,
                };
                tracing::warn!(tag = %self.tag, generation, "{}", error);
                Err(error)
            }
        }
    }

    /// Stop listening
    ///
    /// Events that were already handed to the execution context but have not
    /// reached the callback yet are discarded. Calling `stop` on an idle
    /// listener does nothing.
    ///
    /// Never fails: an unsubscribe error from the event source is logged, and
    /// the listener is invalidated locally regardless.
    pub fn stop(&self) {
        let mut active = self.active.lock();
        let Some(previous) = active.take() else {
            tracing::debug!(tag = %self.tag, "Listener not started, ignoring stop");
            return;
        };

        if let Err(source) = self.source.unsubscribe(&previous.handle) {
            let error = ListenerError::UnsubscribeFailed {
                tag: self.tag.to_string(),
                source,
            };
            tracing::warn!(tag = %self.tag, subscription = %previous.handle, "{}", error);
        }

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::info!(
            tag = %self.tag,
            generation,
            subscription = %previous.handle,
            "Listener stopped"
        );
    }

    pub fn is_listening(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Current generation; 0 until the first `start`
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Build the handler the event source calls for a subscription made
    /// under `generation`
    fn delivery_handler(&self, generation: u64) -> DeliveryHandler {
        let tag = Arc::clone(&self.tag);
        let context = self.context.clone();
        let current = Arc::clone(&self.generation);
        let callback = Arc::clone(&self.callback);

        Arc::new(move |event: Event| {
            let task_tag = Arc::clone(&tag);
            let current = Arc::clone(&current);
            let callback = Arc::clone(&callback);

            let posted = context.post(move || {
                let tag = task_tag;
                let now = current.load(Ordering::Acquire);
                if now == generation {
                    tracing::trace!(tag = %tag, generation, action = event.action(), "Delivering event");
                    callback(event);
                } else {
                    tracing::trace!(
                        tag = %tag,
                        event_generation = generation,
                        current_generation = now,
                        action = event.action(),
                        "Dropping stale event"
                    );
                }
            });

            if let Err(e) = posted {
                tracing::debug!(tag = %tag, "Dropping event: {}", e);
            }
        })
    }
}

impl Drop for VersionedListener {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for VersionedListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionedListener")
            .field("tag", &self.tag)
            .field("context", &self.context)
            .field("filter", &self.filter)
            .field("generation", &self.generation())
            .field("active", &*self.active.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkerConfig;
    use crate::worker::WorkerThread;
    use event_source::{LocalEventSource, SourceError};
    use std::sync::atomic::AtomicUsize;

    const ACTION: &str = "action.test.happy.broadcasts";

    /// Event source whose transport is down
    struct UnavailableSource;

    impl EventSource for UnavailableSource {
        fn subscribe(
            &self,
            _filter: &EventFilter,
            _handler: DeliveryHandler,
        ) -> event_source::Result<SubscriptionHandle> {
            Err(SourceError::Unavailable("transport offline".to_string()))
        }

        fn unsubscribe(&self, handle: &SubscriptionHandle) -> event_source::Result<()> {
            Err(SourceError::UnknownSubscription(handle.clone()))
        }
    }

    /// Event source that accepts subscriptions but fails every teardown
    struct StickySource(LocalEventSource);

    impl EventSource for StickySource {
        fn subscribe(
            &self,
            filter: &EventFilter,
            handler: DeliveryHandler,
        ) -> event_source::Result<SubscriptionHandle> {
            self.0.subscribe(filter, handler)
        }

        fn unsubscribe(&self, _handle: &SubscriptionHandle) -> event_source::Result<()> {
            Err(SourceError::Unavailable("teardown refused".to_string()))
        }
    }

    fn counting_listener(
        worker: &WorkerThread,
        source: Arc<dyn EventSource>,
    ) -> (VersionedListener, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let listener = VersionedListener::new(
            "test-listener",
            worker.context(),
            source,
            EventFilter::for_action(ACTION),
            move |_event| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );
        (listener, count)
    }

    #[test]
    fn test_generation_advances_on_start_and_stop() {
        let worker = WorkerThread::spawn(WorkerConfig::for_tests()).unwrap();
        let source = Arc::new(LocalEventSource::new());
        let (listener, _count) = counting_listener(&worker, source.clone());

        assert_eq!(listener.generation(), 0);
        assert!(!listener.is_listening());

        listener.start().unwrap();
        assert_eq!(listener.generation(), 1);
        assert!(listener.is_listening());
        assert_eq!(source.subscription_count(), 1);

        listener.stop();
        assert_eq!(listener.generation(), 2);
        assert!(!listener.is_listening());
        assert_eq!(source.subscription_count(), 0);
    }

    #[test]
    fn test_redundant_start_is_noop() {
        let worker = WorkerThread::spawn(WorkerConfig::for_tests()).unwrap();
        let source = Arc::new(LocalEventSource::new());
        let (listener, count) = counting_listener(&worker, source.clone());

        listener.start().unwrap();
        listener.start().unwrap();
        assert_eq!(listener.generation(), 1);
        assert_eq!(source.subscription_count(), 1);

        source.publish(Event::new(ACTION));
        worker.wait_for_idle().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_redundant_stop_is_noop() {
        let worker = WorkerThread::spawn(WorkerConfig::for_tests()).unwrap();
        let source = Arc::new(LocalEventSource::new());
        let (listener, _count) = counting_listener(&worker, source);

        listener.stop();
        assert_eq!(listener.generation(), 0);

        listener.start().unwrap();
        listener.stop();
        listener.stop();
        assert_eq!(listener.generation(), 2);
    }

    #[test]
    fn test_subscription_failure_leaves_listener_idle() {
        let worker = WorkerThread::spawn(WorkerConfig::for_tests()).unwrap();
        let (listener, _count) = counting_listener(&worker, Arc::new(UnavailableSource));

        let result = listener.start();
        match result {
            Err(ListenerError::SubscriptionFailed { tag, source }) => {
                assert_eq!(tag, "test-listener");
                assert!(matches!(source, SourceError::Unavailable(_)));
            }
            other => panic!("Expected SubscriptionFailed, got {:?}", other),
        }
        assert!(!listener.is_listening());
        assert_eq!(listener.generation(), 1);

        // Stopping an idle listener must not touch the failing transport
        listener.stop();
        assert_eq!(listener.generation(), 1);

        assert!(listener.start().is_err());
        assert_eq!(listener.generation(), 2);
    }

    #[test]
    fn test_unsubscribe_failure_still_invalidates() {
        let worker = WorkerThread::spawn(WorkerConfig::for_tests()).unwrap();
        let inner = LocalEventSource::new();
        let source = Arc::new(StickySource(inner.clone()));
        let (listener, count) = counting_listener(&worker, source);

        listener.start().unwrap();
        listener.stop();
        assert!(!listener.is_listening());
        assert_eq!(listener.generation(), 2);

        // The transport still routes to the old handler, but the gate rejects it
        assert_eq!(inner.publish(Event::new(ACTION)), 1);
        worker.wait_for_idle().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_closed_context_drops_events() {
        let worker = WorkerThread::spawn(WorkerConfig::for_tests()).unwrap();
        let source = Arc::new(LocalEventSource::new());
        let (listener, count) = counting_listener(&worker, source.clone());

        listener.start().unwrap();
        worker.quit_safely().unwrap();

        assert_eq!(source.publish(Event::new(ACTION)), 1);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let worker = WorkerThread::spawn(WorkerConfig::for_tests()).unwrap();
        let source = Arc::new(LocalEventSource::new());
        let (listener, _count) = counting_listener(&worker, source.clone());

        listener.start().unwrap();
        assert_eq!(source.subscription_count(), 1);

        drop(listener);
        assert_eq!(source.subscription_count(), 0);
    }

    #[test]
    fn test_debug_output() {
        let worker = WorkerThread::spawn(WorkerConfig::for_tests()).unwrap();
        let (listener, _count) = counting_listener(&worker, Arc::new(LocalEventSource::new()));

        let debug = format!("{:?}", listener);
        assert!(debug.contains("test-listener"));
        assert!(debug.contains("generation: 0"));
    }
}
