//! # Lifecycle events emitted by the environment and the shutdown watcher.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Task events**: per-task flow (starting, stopped, failed, rejected)
//! - **Environment events**: stop, cancel and shutdown-signal requests
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task name,
//! correlation id, reasons and the grace delay.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use taskenv::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_task("fetcher")
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("fetcher"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Task events ===
    /// Task body is about to run.
    ///
    /// Sets:
    /// - `task`: task name (named tasks only)
    /// - `request_id`: correlation id (tagged launches only)
    TaskStarting,

    /// Task body returned `Ok(())` or `Err(TaskError::Canceled)`.
    ///
    /// Sets: `task`, `request_id` as for `TaskStarting`.
    TaskStopped,

    /// Task body returned an error; the environment is being cancelled.
    ///
    /// Sets:
    /// - `task`, `request_id` as for `TaskStarting`
    /// - `reason`: failure message
    TaskFailed,

    /// A launch was attempted on a stopped environment.
    ///
    /// Sets: `task` (named tasks only).
    LaunchRejected,

    // === Environment events ===
    /// `Environment::stop` flipped the stopped flag.
    StopRequested,

    /// `Environment::cancel` was the first to cancel the scope.
    ///
    /// Sets: `reason` (cause message, absent for plain cancellation).
    CancelRequested,

    /// Shutdown signal observed; cancellation follows after `delay_ms`.
    ///
    /// Sets:
    /// - `reason`: signal name
    /// - `delay_ms`: configured grace delay
    ShutdownRequested,
}

/// Lifecycle event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Correlation id of the task, if it was launched with one.
    pub request_id: Option<Arc<str>>,
    /// Human-readable reason (errors, signal names).
    pub reason: Option<Arc<str>>,
    /// Grace delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            request_id: None,
            reason: None,
            delay_ms: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a correlation id.
    #[inline]
    pub fn with_request_id(mut self, id: impl Into<Arc<str>>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    #[inline]
    pub(crate) fn with_task_opt(mut self, task: Option<&Arc<str>>) -> Self {
        self.task = task.cloned();
        self
    }

    #[inline]
    pub(crate) fn with_request_id_opt(mut self, id: Option<&Arc<str>>) -> Self {
        self.request_id = id.cloned();
        self
    }
}
