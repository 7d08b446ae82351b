use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use pulse_watcher::accumulator::LocalAccumulator;
use pulse_watcher::args::{Cli, Command, RunArgs, StatusArgs};
use pulse_watcher::clock::SystemClock;
use pulse_watcher::driver::{self, TICK_INTERVAL, TabTracker};
use pulse_watcher::events;
use pulse_watcher::state_file::StateFile;
use pulse_watcher::status;
use pulse_watcher::sync::{self, SyncWorker};

const EVENT_QUEUE: usize = 16;
const SYNC_QUEUE: usize = 32;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log);
    match cli.command {
        Command::Run(args) => run(args).await,
        Command::Status(args) => print_status(args),
    }
}

fn init_logging(level: Option<LevelFilter>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(args: RunArgs) -> Result<()> {
    let (sink, sync_receiver) = sync::queue(SYNC_QUEUE);
    let worker = SyncWorker::new(&args.backend, sync_receiver);
    let accumulator = LocalAccumulator::new(StateFile::new(args.state_file.clone()), Box::new(sink));
    let tracker = TabTracker::new(accumulator, Arc::new(SystemClock));

    let (event_sender, event_receiver) = mpsc::channel(EVENT_QUEUE);
    let reader = tokio::spawn(events::read_events(tokio::io::stdin(), event_sender));

    info!(
        "watching tab events on stdin, state in {}, syncing to {}",
        args.state_file.display(),
        args.backend
    );

    let shutdown = CancellationToken::new();
    tokio::join!(
        detect_shutdown(shutdown.clone()),
        driver::run(tracker, event_receiver, TICK_INTERVAL, shutdown.clone()),
        worker.run(),
    );
    reader.abort();
    Ok(())
}

/// Cancels the loop on ctrl-c; resolves as soon as the token is canceled
/// from any side so the join above can finish on a closed event feed too.
async fn detect_shutdown(cancelation: CancellationToken) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => cancelation.cancel(),
        _ = cancelation.cancelled() => {}
    }
}

fn print_status(args: StatusArgs) -> Result<()> {
    let table = StateFile::new(args.state_file).load();
    print!("{}", status::render(&table));
    Ok(())
}
