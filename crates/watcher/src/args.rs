use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "pulse-watcher", about = "FocusPulse tab watcher")]
pub struct Cli {
    /// Log filter, e.g. `debug`. Defaults to RUST_LOG or `info`.
    #[arg(long = "log-filter", global = true)]
    pub log: Option<LevelFilter>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Observe tab events on stdin and accumulate time locally.
    Run(RunArgs),
    /// Print the locally accumulated totals.
    Status(StatusArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Base URL of the backend receiving 60-second sync batches.
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    pub backend: String,

    /// File the live per-domain table is mirrored to.
    #[arg(long = "state-file", default_value = "focuspulse-state.json")]
    pub state_file: PathBuf,
}

#[derive(Args)]
pub struct StatusArgs {
    /// File the live per-domain table is mirrored to.
    #[arg(long = "state-file", default_value = "focuspulse-state.json")]
    pub state_file: PathBuf,
}
