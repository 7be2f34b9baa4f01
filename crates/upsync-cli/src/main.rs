//! upsync CLI
//!
//! The command-line interface for pulling upstream releases into a
//! customized local tree.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let result = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };
    result.map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {}", e)))
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;
    tracing::debug!("Verbose mode enabled");

    match cli.command {
        Some(cmd) => execute_command(cmd, &cli.local, cli.verbose),
        None => {
            println!("{} Selective upstream synchronization", "upsync".green().bold());
            println!();
            println!("Run {} for available commands.", "upsync --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands, local: &std::path::Path, verbose: bool) -> Result<()> {
    match cmd {
        Commands::Detect { json } => commands::run_detect(local, json),
        Commands::Diff {
            upstream,
            json,
            patch,
        } => commands::run_diff(local, &upstream, json, patch),
        Commands::Sync {
            upstream,
            dry_run,
            conflict,
            json,
        } => commands::run_sync(
            local,
            &upstream,
            &commands::SyncFlags {
                dry_run,
                conflict,
                json,
                verbose,
            },
        ),
        Commands::Bootstrap { upstream, force } => commands::run_bootstrap(local, &upstream, force),
        Commands::Status { json } => commands::run_status(local, json),
        Commands::Backups => commands::run_backups(local),
        Commands::Restore { id } => commands::run_restore(local, &id),
    }
}
