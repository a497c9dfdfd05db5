//! # Signal bridge: OS shutdown signals into environment cancellation.
//!
//! Two independent pieces, each started once per process:
//! - [`ShutdownWatcher`] waits for one termination signal, sleeps the configured grace delay,
//!   then cancels its [`Environment`] with [`TaskError::Signaled`].
//! - [`suppress_sigpipe`] replaces the default SIGPIPE disposition (terminate) with a
//!   listener that drops the signal. Broken-pipe writes still fail with `EPIPE` through
//!   the normal `io::Result` path.
//!
//! ```text
//!   SIGINT / SIGTERM ─► warn!(signal, delay) ─► ShutdownRequested ─► sleep(delay)
//!                                                                      └─► env.cancel(Some(Signaled))
//! ```
//!
//! ## Signals
//! **Unix platforms:** `SIGINT` (Ctrl-C in terminal), `SIGTERM` (default kill signal, used by
//! systemd/Kubernetes).
//!
//! **Windows platforms:** `Ctrl-C` via [`tokio::signal::ctrl_c`].

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::Config;
use crate::core::Environment;
use crate::error::TaskError;
use crate::events::{Event, EventKind};

/// Installed termination-signal listeners.
struct ShutdownSignals {
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
}

impl ShutdownSignals {
    #[cfg(unix)]
    fn install() -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(not(unix))]
    fn install() -> io::Result<Self> {
        Ok(Self {})
    }

    #[cfg(unix)]
    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.sigint.recv()  => "SIGINT",
            _ = self.sigterm.recv() => "SIGTERM",
        }
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) -> &'static str {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "ctrl-c listener failed");
            std::future::pending::<()>().await;
        }
        "ctrl-c"
    }
}

/// Waits for a termination signal and returns its name.
///
/// Each call creates independent signal listeners.
/// Returns `Err` if signal registration fails.
pub async fn wait_for_shutdown_signal() -> io::Result<&'static str> {
    let mut signals = ShutdownSignals::install()?;
    Ok(signals.recv().await)
}

/// Cancels one environment after a shutdown signal and a grace delay.
///
/// # Example
/// ```no_run
/// use taskenv::{Config, Environment, Scope, ShutdownWatcher};
///
/// #[tokio::main]
/// async fn main() -> std::io::Result<()> {
///     let cfg = Config::from_env();
///     let env = Environment::with_config(&Scope::root(), &cfg);
///     ShutdownWatcher::new(&env, &cfg).spawn()?;
///
///     env.go(|ctx| async move {
///         ctx.cancelled().await;
///         Ok(())
///     })
///     .ok();
///
///     if let Err(err) = env.wait().await {
///         assert!(taskenv::is_signaled(&err));
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct ShutdownWatcher {
    env: Environment,
    delay: Duration,
}

impl ShutdownWatcher {
    /// Creates a watcher targeting `env` with `cfg.cancellation_delay` as grace delay.
    pub fn new(env: &Environment, cfg: &Config) -> Self {
        Self {
            env: env.clone(),
            delay: cfg.cancellation_delay,
        }
    }

    /// Grace delay applied between the signal and cancellation.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Installs SIGINT/SIGTERM listeners now and handles the first signal in a background task.
    ///
    /// Listeners are registered before this returns, so no signal sent afterwards is missed.
    /// The watcher handles one signal and does not re-arm.
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        let mut signals = ShutdownSignals::install()?;
        Ok(tokio::spawn(async move {
            let signal = signals.recv().await;
            self.fire(signal).await;
        }))
    }

    /// Same flow as [`spawn`](Self::spawn), with `trigger` standing in for the OS signal.
    ///
    /// `trigger` resolves to the name reported in logs and events.
    pub async fn run_until<F>(self, trigger: F)
    where
        F: Future<Output = &'static str>,
    {
        let signal = trigger.await;
        self.fire(signal).await;
    }

    async fn fire(&self, signal: &'static str) {
        tracing::warn!(signal, delay = ?self.delay, "got signal");
        self.env.bus().publish(
            Event::new(EventKind::ShutdownRequested)
                .with_reason(signal)
                .with_delay(self.delay),
        );

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.env.cancel(Some(TaskError::Signaled));
    }
}

/// Keeps SIGPIPE from terminating the process.
///
/// A listener is registered and its deliveries are dropped. Writes to a closed pipe or socket
/// still return `EPIPE` (`io::ErrorKind::BrokenPipe`). No-op on non-unix platforms.
#[cfg(unix)]
pub fn suppress_sigpipe() -> io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut pipe = signal(SignalKind::pipe())?;
    tokio::spawn(async move {
        while pipe.recv().await.is_some() {
            tracing::trace!("dropped SIGPIPE");
        }
    });
    Ok(())
}

/// Keeps SIGPIPE from terminating the process (no-op on this platform).
#[cfg(not(unix))]
pub fn suppress_sigpipe() -> io::Result<()> {
    Ok(())
}
