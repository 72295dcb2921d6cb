//! Background worker thread acting as a serialized execution context
//!
//! Spawns a thread with its own single-threaded tokio runtime. Tasks posted
//! through an [`ExecutionContext`] run one at a time on that thread, in the
//! order they were posted.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self as std_mpsc, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::WorkerConfig;
use crate::error::{ListenerError, Result};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Commands sent from execution context handles to the worker
enum Command {
    /// Run a task on the worker thread
    Run(Task),
    /// Stop the loop once every earlier command has been handled
    Quit,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Run(_) => f.write_str("Run(..)"),
            Command::Quit => f.write_str("Quit"),
        }
    }
}

/// Cloneable handle for posting work onto a [`WorkerThread`]
///
/// Every clone feeds the same FIFO queue, so tasks posted from one thread run
/// in the order they were posted and never run concurrently with each other.
#[derive(Clone)]
pub struct ExecutionContext {
    name: Arc<str>,
    command_tx: mpsc::UnboundedSender<Command>,
}

impl ExecutionContext {
    /// Name of the worker behind this context
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue a task to run on the worker thread
    ///
    /// Fails with [`ListenerError::ContextClosed`] once the worker has quit.
    pub fn post<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.command_tx
            .send(Command::Run(Box::new(task)))
            .map_err(|_| ListenerError::ContextClosed(self.name.to_string()))
    }

    /// Block until every task posted before this call has run
    ///
    /// Must not be called from the worker thread itself; doing so can only
    /// end in [`ListenerError::IdleTimeout`].
    pub fn wait_for_idle(&self, timeout: Duration) -> Result<()> {
        let (done_tx, done_rx) = std_mpsc::sync_channel(1);
        self.post(move || {
            let _ = done_tx.send(());
        })?;

        done_rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => ListenerError::IdleTimeout {
                context: self.name.to_string(),
                timeout,
            },
            // The marker task was dropped without running: the worker quit first
            RecvTimeoutError::Disconnected => ListenerError::ContextClosed(self.name.to_string()),
        })
    }

    /// Check whether the worker has stopped accepting tasks
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("name", &self.name)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Owns the background thread behind an [`ExecutionContext`]
///
/// Dropping the worker asks it to quit after the tasks already queued, without
/// waiting for it. Use [`quit_safely`](WorkerThread::quit_safely) to wait.
pub struct WorkerThread {
    context: ExecutionContext,
    config: WorkerConfig,
    handle: Option<JoinHandle<()>>,
}

impl WorkerThread {
    /// Spawn a worker thread with the given configuration
    pub fn spawn(config: WorkerConfig) -> Result<Self> {
        config.validate()?;

        // Create a new single-threaded tokio runtime for this worker
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let name: Arc<str> = Arc::from(config.name.as_str());
        let loop_name = Arc::clone(&name);
        let catch_panics = config.catch_panics;

        let handle = thread::Builder::new()
            .name(config.name.clone())
            .spawn(move || {
                runtime.block_on(run_task_loop(loop_name, command_rx, catch_panics));
            })?;

        Ok(Self {
            context: ExecutionContext { name, command_tx },
            config,
            handle: Some(handle),
        })
    }

    /// Spawn a worker with default settings and the given thread name
    pub fn named(name: impl Into<String>) -> Result<Self> {
        Self::spawn(WorkerConfig::new(name))
    }

    /// Get a handle for posting tasks to this worker
    pub fn context(&self) -> ExecutionContext {
        self.context.clone()
    }

    pub fn name(&self) -> &str {
        self.context.name()
    }

    /// Wait for queued tasks using the configured idle timeout
    pub fn wait_for_idle(&self) -> Result<()> {
        self.context.wait_for_idle(self.config.idle_timeout)
    }

    /// Run every task already queued, then stop the worker and join its thread
    pub fn quit_safely(mut self) -> Result<()> {
        let _ = self.context.command_tx.send(Command::Quit);

        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| ListenerError::WorkerPanicked(self.name().to_string()))?;
        }

        Ok(())
    }
}

impl Drop for WorkerThread {
    fn drop(&mut self) {
        if self.handle.is_some() {
            tracing::debug!(worker = %self.context.name, "WorkerThread dropping, requesting quit");
            let _ = self.context.command_tx.send(Command::Quit);
        }
    }
}

impl fmt::Debug for WorkerThread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerThread")
            .field("context", &self.context)
            .field("config", &self.config)
            .finish()
    }
}

/// Main task loop running inside the worker's tokio runtime
async fn run_task_loop(
    name: Arc<str>,
    mut command_rx: mpsc::UnboundedReceiver<Command>,
    catch_panics: bool,
) {
    tracing::info!(worker = %name, "Worker started");

    while let Some(command) = command_rx.recv().await {
        match command {
            Command::Run(task) => {
                if !catch_panics {
                    task();
                } else if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                    tracing::error!(worker = %name, "Task panicked, worker continues");
                }
            }
            Command::Quit => {
                tracing::debug!(worker = %name, "Worker received quit command");
                break;
            }
        }
    }

    tracing::info!(worker = %name, "Worker shut down");
}
