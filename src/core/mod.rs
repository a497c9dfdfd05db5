//! Runtime core: scopes, the environment and the signal bridge.
//!
//! Internal modules:
//! - [`scope`]: done signal plus single-assignment cause, with parent propagation;
//! - [`environment`]: task launch/tracking, first-error-wins slot, joint cancellation;
//! - [`shutdown`]: SIGINT/SIGTERM bridge and SIGPIPE suppression.

mod environment;
mod scope;
mod shutdown;

pub use environment::{Environment, REQUEST_ID, request_id};
pub use scope::Scope;
pub use shutdown::{ShutdownWatcher, suppress_sigpipe, wait_for_shutdown_signal};
