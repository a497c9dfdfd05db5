//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by the environment and the
//! shutdown watcher.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Environment` (launch, stop, cancel, task exit), `ShutdownWatcher`.
//! - **Consumers**: whoever calls [`Environment::subscribe`](crate::Environment::subscribe).

mod bus;
mod event;

pub(crate) use bus::Bus;
pub use event::{Event, EventKind};
