//! # Versioned Listener
//!
//! Race-free start/stop semantics for callbacks fed by an asynchronous event
//! source.
//!
//! ## Overview
//!
//! Subscribing, delivering and unsubscribing happen on different threads, so
//! an event can still be in flight when a listener is stopped. A plain
//! "active" flag cannot reject it reliably: a stop followed quickly by a start
//! flips the flag back before the stale event is processed. This crate tags
//! every subscription with a monotonically increasing generation and checks
//! it at processing time instead.
//!
//! ## Key Features
//!
//! - **Generation gating**: callbacks fire if and only if the listener is started
//! - **Serialized delivery**: gating and callbacks run on one [`WorkerThread`],
//!   in the order the event source delivered the events
//! - **Non-blocking teardown**: `stop` never waits for in-flight events to drain
//! - **Pluggable transport**: anything implementing [`EventSource`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use event_source::{Event, EventFilter, LocalEventSource};
//! use versioned_listener::{VersionedListener, WorkerThread};
//!
//! let worker = WorkerThread::named("tether")?;
//! let source = Arc::new(LocalEventSource::new());
//!
//! let listener = VersionedListener::new(
//!     "upstream",
//!     worker.context(),
//!     source.clone(),
//!     EventFilter::for_action("tether.upstream_changed"),
//!     |event| println!("upstream changed: {:?}", event.payload()),
//! );
//!
//! listener.start()?;
//! source.publish(Event::new("tether.upstream_changed"));
//! listener.stop();
//! ```
//!
//! ## Architecture
//!
//! ```text
//! control thread              event source thread          worker thread
//! ──────────────              ───────────────────          ─────────────
//! start(): gen += 1
//!          subscribe(filter) ─► handler(event) ──post──►  gen_at_subscribe == gen?
//!                                                          ├─ yes: callback(event)
//! stop():  unsubscribe                                     └─ no:  drop
//!          gen += 1
//! ```

pub mod config;
pub mod error;
pub mod listener;
pub mod logging;
pub mod worker;

// Re-export main types for convenience
pub use config::WorkerConfig;
pub use error::{ListenerError, Result};
pub use listener::{ListenerCallback, VersionedListener};
pub use worker::{ExecutionContext, WorkerThread};

// Re-export commonly used types from dependencies
pub use event_source::{Event, EventFilter, EventSource, LocalEventSource, SourceError};

/// Prelude module for convenient imports
///
/// ```rust
/// use versioned_listener::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Event, EventFilter, EventSource, ExecutionContext, ListenerError, LocalEventSource,
        Result, VersionedListener, WorkerConfig, WorkerThread,
    };
}
