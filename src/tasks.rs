//! # Named tasks.
//!
//! [`Environment::go`](crate::Environment::go) takes plain closures. A [`Task`] adds a name,
//! which becomes the `task` field of the tracing span and of every lifecycle event, and can
//! be shared as a [`TaskRef`] and launched more than once.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::Scope;
use crate::error::TaskError;

/// Shared handle accepted by [`Environment::go_task`](crate::Environment::go_task).
pub type TaskRef = Arc<dyn Task>;

/// A named body run under an environment's [`Scope`].
///
/// `run` is called once per launch and should return soon after the scope is done.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use taskenv::{Scope, Task, TaskError};
///
/// struct Flush;
///
/// #[async_trait]
/// impl Task for Flush {
///     fn name(&self) -> &str { "flush" }
///
///     async fn run(&self, ctx: Scope) -> Result<(), TaskError> {
///         ctx.cancelled().await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Name reported in spans and events.
    fn name(&self) -> &str;

    /// Body of one launch.
    async fn run(&self, ctx: Scope) -> Result<(), TaskError>;
}

/// Names a closure so it can be launched as a [`TaskRef`].
///
/// Each launch calls the closure again, so per-run state lives inside the returned future
/// and shared state goes in an explicit `Arc`.
///
/// ```
/// use taskenv::{Scope, TaskError, TaskFn, TaskRef};
///
/// let t: TaskRef = TaskFn::arc("worker", |ctx: Scope| async move {
///     ctx.cancelled().await;
///     Ok::<_, TaskError>(())
/// });
/// assert_eq!(t.name(), "worker");
/// ```
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Wraps `f` under `name`, ready to hand to [`go_task`](crate::Environment::go_task).
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            f,
        })
    }
}

#[async_trait]
impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(Scope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: Scope) -> Result<(), TaskError> {
        (self.f)(ctx).await
    }
}
