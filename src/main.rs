//! # subwatch
//!
//! Runs one reconciliation cycle and exits. Scheduling is left to cron or a
//! systemd timer.
//!
//! ## Initialization Sequence
//!
//! 1. **Configuration** - defaults, then `--config`, then environment
//! 2. **SurrealDB Connection** - connect to the state store and verify health
//! 3. **Collaborators** - upstream fetcher, issue notifier, banned-list sink
//! 4. **Cycle** - reconcile every participating sub, commit the banned list
//!
//! ## Exit Codes
//!
//! `0` when the cycle completes (individual subs may still have failed and
//! been logged), `1` on any fatal error.

#![forbid(unsafe_code)]
#![forbid(clippy::unwrap_used)]
#![forbid(clippy::panic)]
#![deny(clippy::expect_used)]

mod cli;
mod config;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use subwatch_reconciler::{CycleReport, CycleRunner, ListSources, Reconciler};
use subwatch_store::{StateStore, StoreConfig, SurrealStateStore};
use subwatch_tracker::{GitHubBannedList, GitHubClient, IssueNotifier};
use subwatch_upstream::{JsonSource, ResilientFetcher, SubDirectoryReader, UpstreamClient};

use crate::cli::Cli;
use crate::config::{SubwatchConfig, TOKEN_VAR};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let start_time = Instant::now();
    info!("subwatch starting");

    match run(&cli).await {
        Ok(report) => {
            info!(
                elapsed = ?start_time.elapsed(),
                processed = report.processed(),
                failed = report.failed.len(),
                "Done"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing subscriber with environment filter.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run(cli: &Cli) -> Result<CycleReport> {
    let config =
        SubwatchConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config
        .cycle
        .validate()
        .context("Invalid cycle configuration")?;

    if config.tracker.token.is_none() {
        warn!("{TOKEN_VAR} is not set; issue and commit requests will be unauthenticated");
    }

    let store = init_store(config.store.clone()).await.context(
        "State store initialization failed. Please check the store URL and permissions",
    )?;
    info!("SurrealDB connected and healthy");

    let runner = build_runner(&config, store)?;
    runner.run().await.context("Cycle aborted")
}

/// Connect to the state store and verify it answers.
async fn init_store(config: StoreConfig) -> Result<Arc<dyn StateStore>> {
    let store = SurrealStateStore::connect(config)
        .await
        .context("Failed to connect to SurrealDB")?;

    store
        .health_check()
        .await
        .context("SurrealDB health check failed")?;

    Ok(Arc::new(store))
}

/// Wire the collaborators into a cycle runner.
fn build_runner(config: &SubwatchConfig, store: Arc<dyn StateStore>) -> Result<CycleRunner> {
    let upstream = UpstreamClient::with_config(config.upstream.clone())
        .context("Failed to build upstream client")?;
    let fetcher: Arc<dyn JsonSource> = Arc::new(ResilientFetcher::new(upstream));

    let github = GitHubClient::with_config(config.tracker.clone())
        .context("Failed to build issue tracker client")?;
    let notifier = Arc::new(IssueNotifier::new(github.clone()));
    let banned_sink = Arc::new(GitHubBannedList::new(github));

    let reconciler = Arc::new(Reconciler::new(
        Arc::clone(&fetcher),
        store,
        notifier,
        config.cycle.clone(),
    ));

    let directory = SubDirectoryReader::new(
        Arc::clone(&fetcher),
        config.upstream.directory_path.clone(),
        &config.upstream.excluded_subs,
    );

    let list_sources = ListSources {
        membership_url: config.upstream.membership_url.clone(),
        banned_url: config.upstream.banned_url.clone(),
    };

    Ok(CycleRunner::new(
        directory,
        fetcher,
        list_sources,
        reconciler,
        banned_sink,
    ))
}
