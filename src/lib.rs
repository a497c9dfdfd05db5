//! # taskenv
//!
//! **taskenv** is a cooperative task-lifecycle supervisor for tokio.
//!
//! An [`Environment`] launches tasks, hands each of them the same cancellation [`Scope`],
//! cancels that scope when any task fails (or on request, or on a shutdown signal) and
//! offers a single join point, [`Environment::wait`], that resolves once every launched
//! task has returned. Only the first failure is kept.
//!
//! ## Architecture
//! ```text
//!   parent Scope ──derive──► Environment scope ────────────────┐
//!                                 │                            │ observed by
//!        go / go_with_id / go_task│                            ▼
//!                                 ├──► task #1 ──┐      ctx.cancelled().await
//!                                 ├──► task #2 ──┼── Err(e) ──► cancel(Some(e))
//!                                 └──► task #N ──┘                 │
//!                                                                  ├─► error slot (first wins)
//!   ShutdownWatcher ── SIGINT/SIGTERM ── sleep(delay) ─────────────┤
//!                                            cancel(Some(Signaled))└─► scope cancelled
//!
//!   wait(): gate closed (stop/cancel) ─► all tasks returned ─► first error or Ok(())
//! ```
//!
//! ## Features
//! | Area              | Description                                                        | Key types                                   |
//! |-------------------|--------------------------------------------------------------------|---------------------------------------------|
//! | **Scopes**        | Done signal with one recorded cause; outer-to-inner propagation.   | [`Scope`]                                   |
//! | **Supervision**   | Launch, stop, cancel, join; first error wins.                      | [`Environment`]                             |
//! | **Tasks**         | Closures or named trait objects.                                   | [`Task`], [`TaskFn`], [`TaskRef`]           |
//! | **Signals**       | Grace-delayed cancellation on SIGINT/SIGTERM; SIGPIPE suppression. | [`ShutdownWatcher`], [`suppress_sigpipe`]   |
//! | **Errors**        | Typed errors for tasks and the environment.                        | [`TaskError`], [`RuntimeError`]             |
//! | **Events**        | Broadcast lifecycle events.                                        | [`Event`], [`EventKind`]                    |
//! | **Configuration** | Grace delay (`CANCELLATION_DELAY_SECONDS`) and bus capacity.       | [`Config`]                                  |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskenv::{Config, Environment, Scope, ShutdownWatcher, TaskError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::from_env();
//!     let env = Environment::with_config(&Scope::root(), &cfg);
//!     ShutdownWatcher::new(&env, &cfg).spawn()?;
//!
//!     env.go_with_id(|ctx: Scope| async move {
//!         tokio::select! {
//!             _ = ctx.cancelled() => Ok(()),
//!             _ = tokio::time::sleep(Duration::from_millis(10)) => {
//!                 Err(TaskError::fail("worker gave up"))
//!             }
//!         }
//!     })?;
//!
//!     match env.wait().await {
//!         Err(err) if taskenv::is_signaled(&err) => println!("shut down by signal"),
//!         Err(err) => println!("failed: {err}"),
//!         Ok(()) => println!("done"),
//!     }
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod tasks;

// ---- Public re-exports ----

pub use config::{CANCELLATION_DELAY_ENV, Config};
pub use crate::core::{
    Environment, REQUEST_ID, Scope, ShutdownWatcher, request_id, suppress_sigpipe,
    wait_for_shutdown_signal,
};
pub use error::{RuntimeError, TaskError, is_signaled};
pub use events::{Event, EventKind};
pub use tasks::{Task, TaskFn, TaskRef};
