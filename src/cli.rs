//! CLI definition using clap.

use std::path::PathBuf;

use clap::Parser;

/// subwatch - one reconciliation cycle per invocation
#[derive(Parser, Debug)]
#[command(name = "subwatch")]
#[command(version)]
#[command(about = "Watches protest subs for johnoliver changes and keeps the banned list in sync")]
#[command(
    long_about = "Runs a single cycle: reads the participating subs, files review issues for stickied-post changes and commits banned-list updates. Schedule it externally."
)]
pub struct Cli {
    /// Configuration file (.toml or .json)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
