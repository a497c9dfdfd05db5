//! # Environment: launch, track and jointly cancel a group of tasks.
//!
//! The [`Environment`] owns one [`Scope`] derived from the caller's scope, a
//! [`TaskTracker`] counting in-flight tasks, a stopped gate and a single-write error slot.
//!
//! ```text
//!   go(f) / go_with_id(f) / go_task(t)
//!        │  (gate read-locked: rejected once stopped)
//!        └──► tracker.spawn(run_task)
//!                  ├─ Ok / Err(Canceled) after cancel ─► TaskStopped
//!                  ├─ Err(Canceled) on its own        ─► TaskFailed ─► cancel(None)
//!                  ├─ Err(e)                          ─► TaskFailed ─► cancel(Some(e))
//!                  └─ panic                           ─► TaskFailed ─► cancel(Some(Panicked)) ─► resume_unwind
//!
//!   cancel(cause) ─► error slot (set if empty) ─► close gate ─► scope.cancel(cause)
//!
//!   wait() ─► until gate closed (stop / cancel / parent cancelled)
//!          ─► until tracker empty
//!          ─► first recorded error or Ok(())
//! ```
//!
//! ## Rules
//! - Exactly one error is retained: the first one written to the slot.
//! - Cancellation is cooperative; tasks are never aborted, and `wait` joins all of them.
//! - `Err(TaskError::Canceled)` after the scope was cancelled is a graceful exit. Returned
//!   while the scope is still live, it cancels the environment without recording an error.
//! - A panicking task cancels the environment with [`TaskError::Panicked`], then the panic
//!   resumes unwinding inside its tokio task.
//!
//! ## Example
//! ```rust
//! use taskenv::{Environment, Scope, TaskError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let env = Environment::new(&Scope::root());
//!
//!     env.go(|ctx: Scope| async move {
//!         ctx.cancelled().await;
//!         Ok(())
//!     })
//!     .unwrap();
//!     env.go(|_ctx: Scope| async move { Err(TaskError::fail("boom")) })
//!         .unwrap();
//!
//!     assert_eq!(env.wait().await, Err(TaskError::fail("boom")));
//! }
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use futures::FutureExt;
use tokio::sync::broadcast;
use tokio_util::task::TaskTracker;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::Config;
use crate::core::Scope;
use crate::error::{RuntimeError, TaskError};
use crate::events::{Bus, Event, EventKind};
use crate::tasks::TaskRef;

tokio::task_local! {
    /// Correlation id of a task launched with [`Environment::go_with_id`].
    ///
    /// Visible to the task body and everything it awaits on the same task.
    pub static REQUEST_ID: Arc<str>;
}

/// Returns the correlation id of the current task, if it was launched with an id.
///
/// ```
/// assert_eq!(taskenv::request_id(), None);
/// ```
pub fn request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.to_string()).ok()
}

/// Coordinates task launch, tracking and joint shutdown.
///
/// Cheap to clone; clones refer to the same environment.
#[derive(Clone, Debug)]
pub struct Environment {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    scope: Scope,
    tracker: TaskTracker,
    stopped: RwLock<bool>,
    error: OnceLock<TaskError>,
    bus: Bus,
}

impl Environment {
    /// Creates an environment whose scope is derived from `parent`.
    pub fn new(parent: &Scope) -> Self {
        Self::with_config(parent, &Config::default())
    }

    /// Creates an environment with an explicit configuration.
    pub fn with_config(parent: &Scope, cfg: &Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                scope: parent.derive(),
                tracker: TaskTracker::new(),
                stopped: RwLock::new(false),
                error: OnceLock::new(),
                bus: Bus::new(cfg.bus_capacity),
            }),
        }
    }

    /// Launches `f` as a new tokio task observing the environment's scope.
    ///
    /// Any returned error cancels the whole environment; all but
    /// [`TaskError::Canceled`] are also recorded.
    /// Returns [`RuntimeError::Stopped`] without starting anything once stopped.
    ///
    /// Must be called inside a tokio runtime.
    pub fn go<F, Fut>(&self, f: F) -> Result<(), RuntimeError>
    where
        F: FnOnce(Scope) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.launch(None, false, f)
    }

    /// Like [`go`](Self::go), and binds a fresh UUID v4 as the task's correlation id.
    ///
    /// The id is available through [`Scope::request_id`], [`request_id`] and the
    /// `request_id` field of the task's tracing span.
    pub fn go_with_id<F, Fut>(&self, f: F) -> Result<(), RuntimeError>
    where
        F: FnOnce(Scope) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.launch(None, true, f)
    }

    /// Launches a named [`Task`](crate::Task).
    pub fn go_task(&self, task: TaskRef) -> Result<(), RuntimeError> {
        let name: Arc<str> = Arc::from(task.name());
        self.launch(Some(name), false, move |ctx| async move {
            task.run(ctx).await
        })
    }

    /// Launches a named [`Task`](crate::Task) with a fresh correlation id.
    pub fn go_task_with_id(&self, task: TaskRef) -> Result<(), RuntimeError> {
        let name: Arc<str> = Arc::from(task.name());
        self.launch(Some(name), true, move |ctx| async move {
            task.run(ctx).await
        })
    }

    /// Stops accepting new tasks. Running tasks and the scope are left alone.
    pub fn stop(&self) {
        if self.close() {
            tracing::debug!("environment stopped");
            self.inner.bus.publish(Event::new(EventKind::StopRequested));
        }
    }

    /// Cancels the environment.
    ///
    /// A `Some` cause is recorded as the environment error unless one is already recorded;
    /// `None` cancels without recording anything. New launches are rejected afterwards.
    /// Returns `true` if this call was the first to cancel the scope.
    pub fn cancel(&self, cause: Option<TaskError>) -> bool {
        if let Some(err) = &cause {
            let _ = self.inner.error.set(err.clone());
        }
        self.close();

        let reason = cause.as_ref().map(ToString::to_string);
        let first = self.inner.scope.cancel(cause);
        if first {
            tracing::debug!(cause = reason.as_deref(), "environment cancelled");
            let mut ev = Event::new(EventKind::CancelRequested);
            if let Some(reason) = reason {
                ev = ev.with_reason(reason);
            }
            self.inner.bus.publish(ev);
        }
        first
    }

    /// Waits until the environment is stopped or cancelled and every launched task returned.
    ///
    /// Returns the first recorded error, or `Ok(())`.
    pub async fn wait(&self) -> Result<(), TaskError> {
        tokio::select! {
            _ = self.inner.tracker.wait() => {}
            _ = self.inner.scope.cancelled() => {
                self.close();
                self.inner.tracker.wait().await;
            }
        }
        self.inner.scope.cancel(None);

        match self.inner.error.get() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// The environment's scope (the one handed to untagged tasks).
    pub fn scope(&self) -> &Scope {
        &self.inner.scope
    }

    /// Number of tasks launched and not yet returned.
    pub fn in_flight(&self) -> usize {
        self.inner.tracker.len()
    }

    /// Returns `true` once launches are rejected.
    pub fn is_stopped(&self) -> bool {
        *self
            .inner
            .stopped
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribes to lifecycle events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    pub(crate) fn bus(&self) -> &Bus {
        &self.inner.bus
    }

    fn launch<F, Fut>(
        &self,
        name: Option<Arc<str>>,
        tagged: bool,
        f: F,
    ) -> Result<(), RuntimeError>
    where
        F: FnOnce(Scope) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        // Held until the task is tracked, so `close` cannot interleave.
        let stopped = self
            .inner
            .stopped
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if *stopped {
            drop(stopped);
            tracing::debug!(task = name.as_deref(), "launch rejected: environment stopped");
            self.inner
                .bus
                .publish(Event::new(EventKind::LaunchRejected).with_task_opt(name.as_ref()));
            return Err(RuntimeError::Stopped);
        }

        let request_id: Option<Arc<str>> = tagged.then(|| Arc::from(Uuid::new_v4().to_string()));
        let scope = match &request_id {
            Some(id) => self.inner.scope.with_request_id(id.clone()),
            None => self.inner.scope.clone(),
        };
        let span = tracing::info_span!(
            "task",
            task = name.as_deref(),
            request_id = request_id.as_deref()
        );
        let run = run_task(self.clone(), scope, name, request_id.clone(), f).instrument(span);

        match request_id {
            Some(id) => {
                self.inner.tracker.spawn(REQUEST_ID.scope(id, run));
            }
            None => {
                self.inner.tracker.spawn(run);
            }
        }
        Ok(())
    }

    /// Closes the launch gate; returns `true` if it was open.
    fn close(&self) -> bool {
        let mut stopped = self
            .inner
            .stopped
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if *stopped {
            return false;
        }
        *stopped = true;
        self.inner.tracker.close();
        true
    }
}

async fn run_task<F, Fut>(
    env: Environment,
    scope: Scope,
    name: Option<Arc<str>>,
    request_id: Option<Arc<str>>,
    f: F,
) where
    F: FnOnce(Scope) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    let bus = env.bus();
    let event = |kind| {
        Event::new(kind)
            .with_task_opt(name.as_ref())
            .with_request_id_opt(request_id.as_ref())
    };

    bus.publish(event(EventKind::TaskStarting));
    let observed = scope.clone();
    let outcome = AssertUnwindSafe(async move { f(scope).await })
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(())) => {
            tracing::trace!("task stopped");
            bus.publish(event(EventKind::TaskStopped));
        }
        Ok(Err(TaskError::Canceled)) if observed.is_cancelled() => {
            tracing::trace!("task stopped after cancellation");
            bus.publish(event(EventKind::TaskStopped));
        }
        Ok(Err(TaskError::Canceled)) => {
            tracing::debug!("task gave up; cancelling environment");
            bus.publish(event(EventKind::TaskFailed).with_reason(TaskError::Canceled.to_string()));
            env.cancel(None);
        }
        Ok(Err(err)) => {
            tracing::debug!(error = %err, "task failed; cancelling environment");
            bus.publish(event(EventKind::TaskFailed).with_reason(err.to_string()));
            env.cancel(Some(err));
        }
        Err(payload) => {
            let err = TaskError::Panicked {
                info: panic_info(payload.as_ref()),
            };
            tracing::error!(error = %err, "task panicked; cancelling environment");
            bus.publish(event(EventKind::TaskFailed).with_reason(err.to_string()));
            env.cancel(Some(err));
            panic::resume_unwind(payload);
        }
    }
}

fn panic_info(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::{Barrier, oneshot};

    use crate::tasks::TaskFn;

    #[tokio::test]
    async fn test_stop_waits_for_running_tasks() {
        let env = Environment::new(&Scope::root());
        let (tx, rx) = oneshot::channel::<()>();
        let finished = Arc::new(AtomicBool::new(false));

        env.go(|_ctx| async { Ok(()) }).unwrap();
        let f = finished.clone();
        env.go(move |_ctx| async move {
            let _ = rx.await;
            f.store(true, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

        env.stop();
        assert!(!env.scope().is_cancelled());
        tx.send(()).unwrap();

        assert_eq!(env.wait().await, Ok(()));
        assert!(finished.load(Ordering::SeqCst));
        assert_eq!(env.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_cancel_error_is_returned_by_wait() {
        let env = Environment::new(&Scope::root());
        let waiter = {
            let env = env.clone();
            tokio::spawn(async move { env.wait().await })
        };

        let (tx, rx) = oneshot::channel::<()>();
        env.go(move |_ctx| async move {
            let _ = tx.send(());
            Ok(())
        })
        .unwrap();
        rx.await.unwrap();

        assert!(env.cancel(Some(TaskError::fail("test"))));
        assert_eq!(waiter.await.unwrap(), Err(TaskError::fail("test")));
    }

    #[tokio::test]
    async fn test_task_failure_cancels_siblings() {
        let env = Environment::new(&Scope::root());
        let (tx, rx) = oneshot::channel::<()>();

        for _ in 0..2 {
            env.go(|ctx| async move {
                ctx.cancelled().await;
                Ok(())
            })
            .unwrap();
        }
        env.go(move |_ctx| async move {
            let _ = rx.await;
            Err(TaskError::fail("test"))
        })
        .unwrap();

        tx.send(()).unwrap();
        assert_eq!(env.wait().await, Err(TaskError::fail("test")));
        assert_eq!(env.scope().cause(), Some(TaskError::fail("test")));
    }

    #[tokio::test]
    async fn test_go_with_id_binds_uuid() {
        let env = Environment::new(&Scope::root());
        let (tx, rx) = oneshot::channel();

        env.go_with_id(move |ctx| async move {
            let nested = async { request_id() }.await;
            let _ = tx.send((ctx.request_id().map(str::to_owned), nested));
            Ok(())
        })
        .unwrap();

        env.stop();
        assert_eq!(env.wait().await, Ok(()));

        let (from_scope, from_local) = rx.await.unwrap();
        let id = from_scope.expect("id bound to scope");
        assert_eq!(id.len(), 36);
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(from_local.as_deref(), Some(id.as_str()));
    }

    #[tokio::test]
    async fn test_concurrent_ids_are_distinct() {
        let env = Environment::new(&Scope::root());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        for _ in 0..16 {
            let tx = tx.clone();
            env.go_with_id(move |ctx| async move {
                let _ = tx.send(ctx.request_id().map(str::to_owned));
                Ok(())
            })
            .unwrap();
        }
        drop(tx);
        env.stop();
        env.wait().await.unwrap();

        let mut ids = HashSet::new();
        while let Some(id) = rx.recv().await {
            let id = id.unwrap();
            assert_eq!(id.len(), 36);
            ids.insert(id);
        }
        assert_eq!(ids.len(), 16);
    }

    #[tokio::test]
    async fn test_untagged_task_has_no_id() {
        let env = Environment::new(&Scope::root());
        let (tx, rx) = oneshot::channel();
        env.go(move |ctx| async move {
            let _ = tx.send((ctx.request_id().is_none(), request_id().is_none()));
            Ok(())
        })
        .unwrap();
        env.stop();
        env.wait().await.unwrap();
        assert_eq!(rx.await.unwrap(), (true, true));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_joins_every_task() {
        let env = Environment::new(&Scope::root());
        let done = Arc::new(AtomicUsize::new(0));

        for i in 0..50u64 {
            let done = done.clone();
            env.go(move |_ctx| async move {
                tokio::time::sleep(Duration::from_millis(i * 7 % 40)).await;
                done.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        }
        env.stop();

        env.wait().await.unwrap();
        assert_eq!(done.load(Ordering::SeqCst), 50);
    }

    #[tokio::test]
    async fn test_wait_with_no_tasks() {
        let env = Environment::new(&Scope::root());
        env.stop();
        assert_eq!(env.wait().await, Ok(()));
        assert!(env.scope().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tasks_launched_after_wait_started_are_joined() {
        let env = Environment::new(&Scope::root());
        let waiter = {
            let env = env.clone();
            tokio::spawn(async move { env.wait().await })
        };
        tokio::task::yield_now().await;

        let done = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let done = done.clone();
            env.go(move |_ctx| async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                done.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        }
        env.stop();

        assert_eq!(waiter.await.unwrap(), Ok(()));
        assert_eq!(done.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_first_error_is_deterministic() {
        for _ in 0..20 {
            let env = Environment::new(&Scope::root());
            env.go(|_ctx| async { Err(TaskError::fail("a")) }).unwrap();
            env.go(|ctx| async move {
                ctx.cancelled().await;
                Err(TaskError::fail("b"))
            })
            .unwrap();
            env.go(|ctx| async move {
                ctx.cancelled().await;
                Err(TaskError::Canceled)
            })
            .unwrap();

            assert_eq!(env.wait().await, Err(TaskError::fail("a")));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_failure_storm_keeps_exactly_one_error() {
        const N: usize = 64;
        let env = Environment::new(&Scope::root());
        let barrier = Arc::new(Barrier::new(N));

        for i in 0..N {
            let barrier = barrier.clone();
            env.go(move |_ctx| async move {
                barrier.wait().await;
                Err(TaskError::fail(format!("err-{i}")))
            })
            .unwrap();
        }

        match env.wait().await {
            Err(TaskError::Fail { error }) => assert!(error.starts_with("err-")),
            other => panic!("unexpected result {other:?}"),
        }
        assert_eq!(env.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_error_after_plain_cancel_is_recorded() {
        let env = Environment::new(&Scope::root());
        let observed = Arc::new(AtomicBool::new(false));

        let o = observed.clone();
        env.go(move |ctx| async move {
            ctx.cancelled().await;
            o.store(true, Ordering::SeqCst);
            Err(ctx.cause().unwrap_or(TaskError::Canceled))
        })
        .unwrap();

        assert!(env.cancel(None));
        assert!(!env.cancel(Some(TaskError::fail("late"))));
        assert!(env.is_stopped());

        // First write to the empty slot, although the scope was already cancelled.
        assert_eq!(env.wait().await, Err(TaskError::fail("late")));
        assert!(observed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_none_with_graceful_tasks_returns_ok() {
        let env = Environment::new(&Scope::root());
        for _ in 0..3 {
            env.go(|ctx| async move {
                ctx.cancelled().await;
                Err(ctx.cause().unwrap_or(TaskError::Canceled))
            })
            .unwrap();
        }
        env.cancel(None);
        assert_eq!(env.wait().await, Ok(()));
        assert_eq!(env.scope().cause(), Some(TaskError::Canceled));
    }

    #[tokio::test]
    async fn test_panicking_task_cancels_siblings() {
        let env = Environment::new(&Scope::root());
        let mut events = env.subscribe();

        env.go(|ctx| async move {
            ctx.cancelled().await;
            Ok(())
        })
        .unwrap();
        env.go(|_ctx| async move {
            if true {
                panic!("boom");
            }
            Ok(())
        })
        .unwrap();
        env.stop();

        let res = tokio::time::timeout(Duration::from_secs(2), env.wait())
            .await
            .expect("wait must not hang after a panic");
        assert_eq!(
            res,
            Err(TaskError::Panicked {
                info: "boom".into()
            })
        );
        assert!(env.scope().is_cancelled());

        let mut failed = Vec::new();
        while let Ok(ev) = events.try_recv() {
            if ev.kind == EventKind::TaskFailed {
                failed.push(ev.reason);
            }
        }
        assert_eq!(failed, vec![Some(Arc::from("task panicked: boom"))]);
    }

    #[tokio::test]
    async fn test_canceled_on_live_scope_cancels_without_error() {
        let env = Environment::new(&Scope::root());

        env.go(|ctx| async move {
            ctx.cancelled().await;
            Ok(())
        })
        .unwrap();
        env.go(|_ctx| async { Err(TaskError::Canceled) }).unwrap();
        env.stop();

        let res = tokio::time::timeout(Duration::from_secs(2), env.wait())
            .await
            .expect("wait must not hang after a task gives up");
        assert_eq!(res, Ok(()));
        assert_eq!(env.scope().cause(), Some(TaskError::Canceled));
    }

    #[tokio::test]
    async fn test_stop_rejects_new_launches() {
        let env = Environment::new(&Scope::root());
        let mut events = env.subscribe();
        let (tx, rx) = oneshot::channel::<()>();

        env.go(move |_ctx| async move {
            let _ = rx.await;
            Ok(())
        })
        .unwrap();
        env.stop();

        let ran = Arc::new(AtomicBool::new(false));
        let r = ran.clone();
        let res = env.go(move |_ctx| async move {
            r.store(true, Ordering::SeqCst);
            Ok(())
        });
        assert_eq!(res, Err(RuntimeError::Stopped));
        assert_eq!(env.in_flight(), 1);
        assert!(!env.scope().is_cancelled());

        tx.send(()).unwrap();
        assert_eq!(env.wait().await, Ok(()));
        assert!(!ran.load(Ordering::SeqCst));

        let mut kinds = Vec::new();
        while let Ok(ev) = events.try_recv() {
            kinds.push(ev.kind);
        }
        assert!(kinds.contains(&EventKind::StopRequested));
        assert!(kinds.contains(&EventKind::LaunchRejected));
    }

    #[tokio::test]
    async fn test_parent_cancellation_reaches_tasks() {
        let parent = Scope::root();
        let env = Environment::new(&parent);

        env.go(|ctx| async move {
            ctx.cancelled().await;
            Ok(())
        })
        .unwrap();

        parent.cancel(Some(TaskError::Signaled));
        assert_eq!(env.wait().await, Ok(()));
        assert_eq!(env.scope().cause(), Some(TaskError::Signaled));
        assert!(env.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_bounded_parent() {
        let parent = Scope::root().with_timeout(Duration::from_secs(1));
        let env = Environment::new(&parent);

        env.go(|ctx| async move {
            ctx.cancelled().await;
            Err(ctx.cause().unwrap_or(TaskError::Canceled))
        })
        .unwrap();

        assert_eq!(
            env.wait().await,
            Err(TaskError::Timeout {
                timeout: Duration::from_secs(1)
            })
        );
    }

    #[tokio::test]
    async fn test_named_task_events() {
        let env = Environment::new(&Scope::root());
        let mut events = env.subscribe();

        let task: TaskRef = TaskFn::arc("loader", |_ctx: Scope| async move {
            Err::<(), _>(TaskError::fail("disk full"))
        });
        env.go_task_with_id(task).unwrap();

        assert_eq!(env.wait().await, Err(TaskError::fail("disk full")));

        let starting = events.recv().await.unwrap();
        assert_eq!(starting.kind, EventKind::TaskStarting);
        assert_eq!(starting.task.as_deref(), Some("loader"));
        assert_eq!(starting.request_id.as_ref().map(|id| id.len()), Some(36));

        let failed = events.recv().await.unwrap();
        assert_eq!(failed.kind, EventKind::TaskFailed);
        assert_eq!(failed.request_id, starting.request_id);
        assert_eq!(failed.reason.as_deref(), Some("execution failed: disk full"));

        let cancelled = events.recv().await.unwrap();
        assert_eq!(cancelled.kind, EventKind::CancelRequested);
    }

    #[tokio::test]
    async fn test_task_ref_can_be_launched_twice() {
        let env = Environment::new(&Scope::root());
        let runs = Arc::new(AtomicUsize::new(0));
        let r = runs.clone();
        let task: TaskRef = TaskFn::arc("counter", move |_ctx: Scope| {
            let r = r.clone();
            async move {
                r.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TaskError>(())
            }
        });

        env.go_task(task.clone()).unwrap();
        env.go_task(task).unwrap();
        env.stop();
        env.wait().await.unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }
}
