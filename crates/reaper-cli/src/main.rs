//! reaper - stuck build reaper
//!
//! Seeds an in-memory store from a JSON fixture and either runs a single
//! sweep (`--once`) or ticks until SIGINT / SIGTERM.

mod seed;

use std::backtrace::Backtrace;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use reaper_core::app::{BuildError, ReaperBuilder, ReaperLoop, SweepReport};
use reaper_core::domain::{ReaperError, Status};
use reaper_core::impls::{InMemoryCanceler, InMemoryStore};
use reaper_core::ports::{Clock, SystemClock, UlidGenerator};
use seed::{Fixture, SeedError};

#[derive(Parser)]
#[command(name = "reaper", about = "Cancels builds stuck in pending or running", version)]
struct Cli {
    /// JSON fixture with repositories, builds and stages
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Seconds between sweep passes
    #[arg(long, env = "REAPER_INTERVAL_SECS", default_value_t = 60)]
    interval_secs: u64,

    /// Pending deadline in minutes (0 = 24 hours)
    #[arg(long, env = "REAPER_PENDING_DEADLINE_MINS", default_value_t = 0)]
    pending_deadline_mins: u64,

    /// Running deadline in minutes (0 = 24 hours)
    #[arg(long, env = "REAPER_RUNNING_DEADLINE_MINS", default_value_t = 0)]
    running_deadline_mins: u64,

    /// Tolerance buffer in minutes added to every deadline
    #[arg(long, env = "REAPER_BUFFER_MINS", default_value_t = 30)]
    buffer_mins: u64,

    /// Run one sweep, print the report as JSON and exit
    #[arg(long)]
    once: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Seed(#[from] SeedError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Reaper(#[from] ReaperError),

    #[error("cannot encode report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot listen for shutdown signal: {0}")]
    Signal(#[from] std::io::Error),

    #[error("reaper task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("interval must be at least one second")]
    ZeroInterval,
}

#[derive(Serialize)]
struct OnceOutput {
    report: SweepReport,
    builds_by_status: HashMap<Status, usize>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    install_panic_hook();

    if let Err(e) = run(cli).await {
        error!("reaper failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    if cli.interval_secs == 0 {
        return Err(CliError::ZeroInterval);
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = InMemoryStore::new();
    if let Some(path) = &cli.seed {
        let ids = UlidGenerator::new(SystemClock);
        let seeded = Fixture::load(path)?.seed(&store, &ids, clock.now()).await?;
        info!(
            path = %path.display(),
            repositories = seeded.repositories,
            builds = seeded.builds,
            stages = seeded.stages,
            "seeded store"
        );
    }

    let canceler = InMemoryCanceler::with_clock(store.clone(), clock.clone());
    let reaper = ReaperBuilder::new()
        .store(Arc::new(store.clone()))
        .canceler(Arc::new(canceler))
        .clock(clock)
        .pending_deadline(minutes(cli.pending_deadline_mins))
        .running_deadline(minutes(cli.running_deadline_mins))
        .buffer(minutes(cli.buffer_mins))
        .build()?;
    let reaper_loop = ReaperLoop::new(Arc::new(reaper));

    if cli.once {
        let report = reaper_loop.sweep().await?;
        let output = OnceOutput {
            report,
            builds_by_status: store.counts_by_status().await,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let handle = reaper_loop.spawn(Duration::from_secs(cli.interval_secs));
    let signal = wait_for_signal().await?;
    info!("received {signal}, initiating graceful shutdown");
    let reason = handle.shutdown_and_join(signal).await?;
    info!(reason = ?reason, "reaper exited");
    Ok(())
}

/// Log panics through tracing with a backtrace, whatever `RUST_BACKTRACE` says.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let backtrace = Backtrace::force_capture();
        error!(panic = %info, "unexpected panic\n{backtrace}");
    }));
}

fn minutes(m: u64) -> Duration {
    Duration::from_secs(m.saturating_mul(60))
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<&'static str, std::io::Error> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigint.recv() => Ok("SIGINT"),
        _ = sigterm.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<&'static str, std::io::Error> {
    tokio::signal::ctrl_c().await?;
    Ok("SIGINT")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cli = Cli::parse_from(["reaper"]);
        assert_eq!(cli.interval_secs, 60);
        assert_eq!(cli.pending_deadline_mins, 0);
        assert_eq!(cli.buffer_mins, 30);
        assert!(!cli.once);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "reaper",
            "--once",
            "--pending-deadline-mins",
            "60",
            "--buffer-mins",
            "5",
        ]);
        assert!(cli.once);
        assert_eq!(minutes(cli.pending_deadline_mins), Duration::from_secs(3600));
        assert_eq!(minutes(cli.buffer_mins), Duration::from_secs(300));
    }

    #[test]
    fn panic_hook_reports_and_unwinds() {
        install_panic_hook();
        let result: std::thread::Result<()> = std::panic::catch_unwind(|| panic!("pass exploded"));
        let _ = std::panic::take_hook();

        let payload = result.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"pass exploded"));
    }
}
