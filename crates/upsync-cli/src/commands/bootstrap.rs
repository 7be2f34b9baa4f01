//! Bootstrap command implementation

use std::path::Path;

use colored::Colorize;
use upsync_core::SyncEngine;

use super::upstream::resolve;
use crate::cli::UpstreamArgs;
use crate::error::{CliError, Result};

/// Run the bootstrap command
///
/// Records every file present in both trees with its local hash, so an
/// installation that predates upsync starts with a baseline instead of
/// reporting every local edit as upstream change.
pub fn run_bootstrap(local: &Path, args: &UpstreamArgs, force: bool) -> Result<()> {
    let engine = SyncEngine::open(local)?;
    let store = engine.state_store();
    if store.exists() && !force {
        return Err(CliError::user(format!(
            "A baseline already exists at {}; pass --force to replace it",
            store.path()
        )));
    }

    let upstream = resolve(&engine, args)?;
    println!(
        "{} Bootstrapping baseline from {}",
        "=>".blue().bold(),
        upstream.version.cyan()
    );

    let report = engine.bootstrap(&upstream.dir, &upstream.version)?;
    store.save(&report.state)?;

    println!(
        "{} Recorded {} file(s) as of {}.",
        "OK".green().bold(),
        report.recorded,
        upstream.version.cyan()
    );
    if !report.upstream_only.is_empty() {
        println!(
            "   {} {} upstream-only file(s) left to be added by the next sync.",
            "~".dimmed(),
            report.upstream_only.len()
        );
    }
    for (path, message) in &report.errors {
        println!("   {} {}: {}", "!".red(), path, message);
    }
    Ok(())
}
