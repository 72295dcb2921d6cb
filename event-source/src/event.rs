//! Event payloads and the filters used to select them.

use std::collections::BTreeSet;
use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// An event published through an event source.
///
/// Consumers are expected to treat the event as opaque; only the event source
/// looks at `action` to decide which subscriptions receive it.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    action: String,
    payload: Bytes,
    sent_at: DateTime<Utc>,
}

impl Event {
    /// Create an event with an empty payload, stamped with the current time
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            payload: Bytes::new(),
            sent_at: Utc::now(),
        }
    }

    /// Attach a payload to the event
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Time at which the event was created by the publisher
    pub fn sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }
}

/// Describes which events a subscription wants to receive.
///
/// An event matches when its action is one of the filter's actions. A filter
/// with no actions matches nothing.
///
/// # Example
///
/// ```
/// use event_source::{Event, EventFilter};
///
/// let filter = EventFilter::new()
///     .with_action("tether.state_changed")
///     .with_action("tether.upstream_changed");
///
/// assert!(filter.matches(&Event::new("tether.state_changed")));
/// assert!(!filter.matches(&Event::new("wifi.scan_results")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EventFilter {
    actions: BTreeSet<String>,
}

impl EventFilter {
    /// Create an empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filter matching a single action
    pub fn for_action(action: impl Into<String>) -> Self {
        Self::new().with_action(action)
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.add_action(action);
        self
    }

    pub fn add_action(&mut self, action: impl Into<String>) {
        self.actions.insert(action.into());
    }

    /// Check whether an event passes this filter
    pub fn matches(&self, event: &Event) -> bool {
        self.actions.contains(event.action())
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Display for EventFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, action) in self.actions.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", action)?;
        }
        write!(f, "]")
    }
}
