//! Demo binary: saturating producers plus a periodic stats report.
//!
//! Spawns N producer threads that submit no-op tasks scheduled for "now" as
//! fast as they can, while a watcher thread logs the aggregate statistics
//! once per period. Runs until Ctrl-C (or `--duration-secs`).

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use delayq::{CountingHandler, DelayedTaskExecutor, InstrumentedExecutor};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "delayq", about = "Delayed-task scheduler throughput demo")]
struct Args {
    /// Number of producer threads.
    #[arg(long, default_value_t = 2)]
    producers: usize,

    /// Stats reporting period in milliseconds.
    #[arg(long, default_value_t = 1000)]
    watch_period_ms: u64,

    /// Stop after this many seconds instead of waiting for Ctrl-C.
    #[arg(long)]
    duration_secs: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let handler = Arc::new(CountingHandler::new());
    let executor = Arc::new(InstrumentedExecutor::new(DelayedTaskExecutor::with_handler(
        Arc::clone(&handler),
    )));

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            running.store(false, Ordering::SeqCst);
        })?;
    }

    let watcher = {
        let handler = Arc::clone(&handler);
        let executor = Arc::clone(&executor);
        let running = Arc::clone(&running);
        let period = Duration::from_millis(args.watch_period_ms);
        thread::Builder::new()
            .name("delayq-watch".into())
            .spawn(move || {
                while running.load(Ordering::SeqCst) {
                    thread::sleep(period);
                    let stats = handler.stats();
                    tracing::info!(
                        scheduled = executor.scheduled_count(),
                        success = stats.success_count,
                        error = stats.error_count,
                        min_delay_ms = stats.min_delay_ns / 1_000_000,
                        max_delay_ms = stats.max_delay_ns / 1_000_000,
                        avg_delay_ms = (stats.avg_delay_ns / 1e6).round(),
                        "scheduler stats"
                    );
                }
            })?
    };

    let producers: Vec<_> = (0..args.producers)
        .map(|i| {
            let executor = Arc::clone(&executor);
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name(format!("producer-{}", i + 1))
                .spawn(move || {
                    while running.load(Ordering::SeqCst) {
                        executor.submit(Utc::now(), || Ok(()));
                    }
                })
        })
        .collect::<std::io::Result<_>>()?;

    if let Some(secs) = args.duration_secs {
        thread::sleep(Duration::from_secs(secs));
        running.store(false, Ordering::SeqCst);
    }

    for producer in producers {
        let _ = producer.join();
    }
    let _ = watcher.join();

    executor.shutdown();
    tracing::info!("shut down");
    Ok(())
}
