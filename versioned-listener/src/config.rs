//! Configuration types for the worker thread
//!
//! This module defines the settings that control how a [`WorkerThread`]
//! is spawned and how long callers wait for it to drain.
//!
//! [`WorkerThread`]: crate::worker::WorkerThread

use std::time::Duration;

use crate::error::ListenerError;

/// Configuration for a [`WorkerThread`](crate::worker::WorkerThread)
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Name given to the OS thread, also used in logs and errors
    /// Default: "tether-worker"
    pub name: String,

    /// How long `WorkerThread::wait_for_idle` waits for queued tasks
    /// Default: 10 seconds
    pub idle_timeout: Duration,

    /// Keep the worker alive when a task panics
    /// Default: true
    pub catch_panics: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            name: "tether-worker".to_string(),
            idle_timeout: Duration::from_secs(10),
            catch_panics: true,
        }
    }
}

impl WorkerConfig {
    /// Create a WorkerConfig with default values and the given thread name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create a WorkerConfig with a short idle timeout for tests
    pub fn for_tests() -> Self {
        Self {
            name: "tether-test-worker".to_string(),
            idle_timeout: Duration::from_secs(2),
            ..Default::default()
        }
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<(), ListenerError> {
        if self.name.trim().is_empty() {
            return Err(ListenerError::Configuration(
                "Worker name must not be empty".to_string(),
            ));
        }

        if self.idle_timeout == Duration::ZERO {
            return Err(ListenerError::Configuration(
                "Idle timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_catch_panics(mut self, enabled: bool) -> Self {
        self.catch_panics = enabled;
        self
    }
}
