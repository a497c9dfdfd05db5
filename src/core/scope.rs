//! # Cancellation scope: a done signal plus a single-assignment cause.
//!
//! A [`Scope`] pairs a [`CancellationToken`] (the done signal) with a cause slot that is
//! written at most once. Scopes form a tree: [`Scope::derive`] creates a child whose token
//! is a child token of the parent, so outer cancellation reaches inner scopes automatically
//! while inner cancellation never leaks outward.
//!
//! ```text
//!   root ── derive ──► env scope ── with_request_id ──► task scope (same signal, tagged)
//!     │                    │
//!  cancel(cause)       cancel(cause)
//!     └── propagates ──────┘──► every task observing cancelled()
//! ```
//!
//! ## Rules
//! - The cause transitions from "none" to "some" **at most once**; the first caller wins.
//! - Once fired, the done signal stays fired and is visible to late observers.
//! - A scope that is already done through its parent keeps the parent's cause.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Cancellation-propagation unit handed to every task.
///
/// Cheap to clone: clones share the same done signal and cause slot.
///
/// # Example
/// ```
/// use taskenv::{Scope, TaskError};
///
/// let parent = Scope::root();
/// let child = parent.derive();
///
/// assert!(parent.cancel(Some(TaskError::fail("boom"))));
/// assert!(child.is_cancelled());
/// assert_eq!(child.cause(), Some(TaskError::fail("boom")));
/// ```
#[derive(Clone, Debug)]
pub struct Scope {
    token: CancellationToken,
    /// `Some(None)` means cancelled without an error.
    cause: Arc<OnceLock<Option<TaskError>>>,
    parent: Option<Arc<Scope>>,
    request_id: Option<Arc<str>>,
}

impl Scope {
    /// Creates a scope with no parent; it is cancelled only explicitly.
    pub fn root() -> Self {
        Self::from_token(CancellationToken::new())
    }

    /// Wraps an externally owned token as a root scope.
    ///
    /// Cancelling `token` elsewhere marks this scope done with cause [`TaskError::Canceled`].
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            cause: Arc::default(),
            parent: None,
            request_id: None,
        }
    }

    /// Derives a child scope. Parent cancellation propagates inward, never outward.
    ///
    /// The correlation id, if any, is inherited.
    pub fn derive(&self) -> Self {
        Self {
            token: self.token.child_token(),
            cause: Arc::default(),
            parent: Some(Arc::new(self.clone())),
            request_id: self.request_id.clone(),
        }
    }

    /// Derives a child scope that cancels itself with [`TaskError::Timeout`] after `timeout`.
    ///
    /// Must be called inside a tokio runtime (a timer task is spawned).
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let child = self.derive();
        let timer = child.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(timeout) => {
                    timer.cancel(Some(TaskError::Timeout { timeout }));
                }
                _ = timer.cancelled() => {}
            }
        });
        child
    }

    /// Cancels the scope, recording `cause` if this is the first cancellation.
    ///
    /// Safe to call concurrently from any number of callers. Returns `true` only for the
    /// call whose cause was recorded; every later call is a no-op for the cause.
    ///
    /// The cause slot is the single ordering point: a call racing with parent cancellation
    /// wins only if it writes the slot before anyone observes the inherited cause, and
    /// [`cause`](Self::cause) agrees with the returned flag either way.
    pub fn cancel(&self, cause: Option<TaskError>) -> bool {
        if self.token.is_cancelled() {
            self.frozen_cause();
            return false;
        }
        let first = self.cause.set(cause).is_ok();
        self.token.cancel();
        first
    }

    /// Returns `true` once the scope is done.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when the scope is done; completes immediately if it already is.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Why the scope is done, or `None` while it is still running.
    ///
    /// Own recorded cause if any; otherwise the parent's cause (or
    /// [`TaskError::Canceled`]) is recorded on first observation and kept from then on.
    pub fn cause(&self) -> Option<TaskError> {
        if !self.token.is_cancelled() {
            return None;
        }
        Some(
            self.frozen_cause()
                .clone()
                .unwrap_or(TaskError::Canceled),
        )
    }

    /// Slot contents for a done scope, inheriting the parent's cause if still empty.
    fn frozen_cause(&self) -> &Option<TaskError> {
        self.cause
            .get_or_init(|| self.parent.as_ref().and_then(|p| p.cause()))
    }

    /// Correlation id bound by a tagged launch, if any.
    #[inline]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Underlying token, for `select!` against other token-based code.
    #[inline]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Same done signal and cause slot, tagged with `id`.
    pub(crate) fn with_request_id(&self, id: Arc<str>) -> Self {
        Self {
            request_id: Some(id),
            ..self.clone()
        }
    }
}
