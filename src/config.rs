//! # Environment configuration.
//!
//! [`Config`] holds the few knobs the environment and the shutdown watcher read:
//! the grace delay between a shutdown signal and cancellation, and the event bus capacity.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use taskenv::Config;
//!
//! let mut cfg = Config::default();
//! cfg.cancellation_delay = Duration::from_secs(1);
//!
//! assert_eq!(cfg.bus_capacity, 1024);
//! ```

use std::time::Duration;

/// Environment variable overriding [`Config::cancellation_delay`], in whole seconds.
pub const CANCELLATION_DELAY_ENV: &str = "CANCELLATION_DELAY_SECONDS";

const DEFAULT_CANCELLATION_DELAY_SECS: u64 = 5;

/// Configuration for an [`Environment`](crate::Environment) and its [`ShutdownWatcher`](crate::ShutdownWatcher).
#[derive(Clone, Debug)]
pub struct Config {
    /// Pause between receiving SIGINT/SIGTERM and cancelling the environment.
    pub cancellation_delay: Duration,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `cancellation_delay = 5s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            cancellation_delay: Duration::from_secs(DEFAULT_CANCELLATION_DELAY_SECS),
            bus_capacity: 1024,
        }
    }
}

impl Config {
    /// Defaults overridden by `CANCELLATION_DELAY_SECONDS`, if set.
    ///
    /// Malformed values fall back to the default and negative values are clamped to zero;
    /// both cases log a warning and never fail.
    pub fn from_env() -> Self {
        let raw = std::env::var(CANCELLATION_DELAY_ENV).ok();
        Self {
            cancellation_delay: parse_delay_seconds(raw.as_deref()),
            ..Self::default()
        }
    }
}

pub(crate) fn parse_delay_seconds(raw: Option<&str>) -> Duration {
    let default = Duration::from_secs(DEFAULT_CANCELLATION_DELAY_SECS);
    let raw = match raw {
        Some(s) if !s.is_empty() => s,
        _ => return default,
    };

    match raw.parse::<i64>() {
        Ok(secs) if secs < 0 => {
            tracing::warn!(
                env = raw,
                delay = 0,
                "round up negative cancellation delay seconds to 0s"
            );
            Duration::ZERO
        }
        Ok(secs) => Duration::from_secs(secs.unsigned_abs()),
        Err(err) => {
            tracing::warn!(
                error = %err,
                env = raw,
                delay = DEFAULT_CANCELLATION_DELAY_SECS,
                "set default cancellation delay seconds"
            );
            default
        }
    }
}
