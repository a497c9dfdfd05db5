//! Error types used by the environment and its tasks.
//!
//! This module defines two main error enums:
//!
//! - [`RuntimeError`]: errors raised by the environment itself.
//! - [`TaskError`]: errors returned by task bodies and recorded as cancellation causes.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the environment.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The environment was stopped (or cancelled); no new tasks are accepted.
    #[error("environment stopped; launch rejected")]
    Stopped,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use taskenv::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::Stopped.as_label(), "runtime_stopped");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Stopped => "runtime_stopped",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::Stopped => "launch rejected: environment stopped".to_string(),
        }
    }
}

/// # Errors produced by task execution.
///
/// A `TaskError` is both what a task body returns and what a [`Scope`](crate::Scope)
/// records as its cancellation cause, so it is cheap to clone and comparable.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task execution failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// A time-bounded scope ran out of time.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// Scope was cancelled without an error cause.
    ///
    /// Returned by a task it is never recorded; it only cancels the environment if the
    /// scope was still live.
    #[error("context cancelled")]
    Canceled,

    /// The task body panicked.
    #[error("task panicked: {info}")]
    Panicked {
        /// Panic message, when it was a string.
        info: String,
    },

    /// Cancellation was triggered by a process shutdown signal.
    #[error("signaled")]
    Signaled,
}

impl TaskError {
    /// Builds a [`TaskError::Fail`] from anything printable.
    ///
    /// ```
    /// use taskenv::TaskError;
    ///
    /// let err = TaskError::fail("connection refused");
    /// assert_eq!(err.to_string(), "execution failed: connection refused");
    /// ```
    pub fn fail(error: impl fmt::Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use taskenv::TaskError;
    /// use std::time::Duration;
    ///
    /// let err = TaskError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Canceled => "task_canceled",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Signaled => "signaled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            TaskError::Canceled => "context cancelled".to_string(),
            TaskError::Panicked { info } => format!("panic: {info}"),
            TaskError::Signaled => "shutdown signal received".to_string(),
        }
    }

    /// Returns `true` if cancellation was caused by SIGINT/SIGTERM.
    pub fn is_signaled(&self) -> bool {
        matches!(self, TaskError::Signaled)
    }
}

impl From<std::io::Error> for TaskError {
    fn from(err: std::io::Error) -> Self {
        TaskError::fail(err)
    }
}

/// Returns `true` if `err` returned by [`Environment::wait`](crate::Environment::wait)
/// means the process received SIGINT or SIGTERM.
///
/// ```
/// use taskenv::{TaskError, is_signaled};
///
/// assert!(is_signaled(&TaskError::Signaled));
/// assert!(!is_signaled(&TaskError::fail("boom")));
/// ```
pub fn is_signaled(err: &TaskError) -> bool {
    err.is_signaled()
}
