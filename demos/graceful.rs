//! Graceful shutdown demo.
//!
//! Runs two tickers and a flaky worker. Press Ctrl-C to cancel through the signal bridge
//! (after `CANCELLATION_DELAY_SECONDS`, default 5), or wait for the worker to fail.
//!
//! ```text
//! RUST_LOG=debug CANCELLATION_DELAY_SECONDS=1 cargo run --example graceful
//! ```

use std::time::Duration;

use taskenv::{Config, Environment, Scope, ShutdownWatcher, TaskError, TaskFn, TaskRef};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = Config::from_env();
    let env = Environment::with_config(&Scope::root(), &cfg);
    taskenv::suppress_sigpipe()?;
    ShutdownWatcher::new(&env, &cfg).spawn()?;

    for n in 0..2u64 {
        env.go_with_id(move |ctx: Scope| async move {
            let id = ctx.request_id().unwrap_or("-").to_owned();
            loop {
                tokio::select! {
                    _ = ctx.cancelled() => {
                        println!("[ticker-{n}] {id} stopping: {:?}", ctx.cause());
                        return Ok(());
                    }
                    _ = tokio::time::sleep(Duration::from_millis(500 + n * 250)) => {
                        println!("[ticker-{n}] {id} tick");
                    }
                }
            }
        })?;
    }

    let flaky: TaskRef = TaskFn::arc("flaky", |ctx: Scope| async move {
        tokio::select! {
            _ = ctx.cancelled() => Ok(()),
            _ = tokio::time::sleep(Duration::from_secs(10)) => Err(TaskError::fail("gave up after 10s")),
        }
    });
    env.go_task(flaky)?;

    match env.wait().await {
        Err(err) if taskenv::is_signaled(&err) => println!("[main] shut down by signal"),
        Err(err) => println!("[main] failed: {err}"),
        Ok(()) => println!("[main] done"),
    }
    Ok(())
}
