//! Publish/subscribe event sources for tether-sdk.
//!
//! This crate defines the contract that listeners in `versioned-listener`
//! consume, and ships an in-process implementation of it.
//!
//! # Overview
//!
//! - [`EventSource`]: the transport contract, `subscribe(filter, handler)` and
//!   `unsubscribe(handle)`.
//! - [`EventFilter`]: which events a subscription wants, by action name.
//! - [`Event`]: an opaque notification carrying an action and a byte payload.
//! - [`LocalEventSource`]: an in-process broadcast hub that routes published
//!   events to every subscription whose filter matches.
//!
//! The event source knows nothing about the consumers behind a
//! [`DeliveryHandler`]. Handlers are called on the publisher's thread and are
//! expected to forward the event onto their own execution context.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use event_source::{Event, EventFilter, EventSource, LocalEventSource};
//!
//! let source = LocalEventSource::new();
//! let handle = source
//!     .subscribe(
//!         &EventFilter::for_action("tether.state_changed"),
//!         Arc::new(|event: Event| println!("got {}", event.action())),
//!     )
//!     .unwrap();
//!
//! source.publish(Event::new("tether.state_changed").with_payload("wlan0"));
//! source.unsubscribe(&handle).unwrap();
//! ```

pub mod error;
pub mod event;
pub mod router;
pub mod source;

pub use error::{Result, SourceError};
pub use event::{Event, EventFilter};
pub use router::LocalEventSource;
pub use source::{DeliveryHandler, EventSource, SubscriptionHandle};
