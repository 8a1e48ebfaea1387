//! rolesync CLI
//!
//! Plans or applies one reconciliation pass from a configuration file, an
//! instance snapshot and an optional directory snapshot.

mod cli;
mod directory;
mod error;
mod executor;
mod snapshot;

use std::io::{self, IsTerminal};

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rolesync_core::{PrivilegeMap, SyncManager, SyncOptions};
use rolesync_meta::{Config, find_file};

use cli::Cli;
use error::{CliError, Result};
use executor::ScriptExecutor;
use snapshot::{Snapshot, SnapshotInspector};

fn main() {
    match run() {
        Ok(true) => std::process::exit(1),
        Ok(false) => {}
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Run the sync; `Ok(true)` asks for exit status 1
fn run() -> Result<bool> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let cwd = std::env::current_dir()?;
    let path = find_file(cli.config.as_deref(), &cwd)?;
    tracing::info!(path = %path.display(), "Using configuration");
    let config = Config::load(&path)?;

    let snapshot = Snapshot::load(&cli.state)?;
    let inspector = SnapshotInspector::new(snapshot, config.postgres.roles_blacklist.clone());
    let directory = cli.directory.as_deref().map(directory::load).transpose()?;
    let executor = ScriptExecutor::new(io::stdout());

    let mut manager = SyncManager::new(&inspector, &executor)
        .with_privileges(PrivilegeMap::from_config(&config))
        .with_options(SyncOptions { dry_run: !cli.real });
    if let Some(directory) = &directory {
        manager = manager.with_directory(directory);
    }
    if !cli.real {
        tracing::info!("Running in dry mode, no change is written");
    }

    let count = manager.sync(&config.sync_map)?;
    summarize(count, cli.real);
    Ok(cli.check && count > 0)
}

fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(cli.verbose)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {}", e)))?;
    tracing::debug!("Verbose mode enabled");
    Ok(())
}

fn summarize(count: usize, real: bool) {
    if count == 0 {
        tracing::info!("Nothing to do");
    } else if real {
        tracing::info!(count, "Generated {} queries", count);
    } else {
        tracing::info!(count, "Would generate {} queries. Use --real to apply", count);
    }
}
