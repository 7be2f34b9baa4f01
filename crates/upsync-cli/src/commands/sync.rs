//! Sync command implementation
//!
//! Diffs, applies and verifies one upstream version, persists the baseline
//! when the run is clean, and fires post-sync triggers.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;
use upsync_core::sync::SkipReason;
use upsync_core::verify::CheckOutcome;
use upsync_core::{ConflictStrategy, SyncEngine, SyncOptions, SyncOutcome};
use upsync_core::{matching_triggers, run_triggers};

use super::upstream::{report_state_warning, resolve};
use crate::cli::UpstreamArgs;
use crate::error::{CliError, Result};

/// Flags of the sync command
#[derive(Debug, Clone, Copy)]
pub struct SyncFlags {
    pub dry_run: bool,
    pub conflict: ConflictStrategy,
    pub json: bool,
    pub verbose: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    outcome: &'a SyncOutcome,
    triggers: Vec<&'a str>,
}

/// Run the sync command
pub fn run_sync(local: &Path, args: &UpstreamArgs, flags: &SyncFlags) -> Result<()> {
    let engine = SyncEngine::open(local)?;
    let upstream = resolve(&engine, args)?;

    let store = engine.state_store();
    let loaded = store.load();
    report_state_warning(&loaded);
    let mut state = loaded.state;

    if !flags.json {
        let mode = if flags.dry_run { " (dry run)" } else { "" };
        println!(
            "{} Syncing {} with conflict strategy {}{}",
            "=>".blue().bold(),
            upstream.version.cyan(),
            flags.conflict.as_str().cyan(),
            mode
        );
    }

    let options = SyncOptions {
        dry_run: flags.dry_run,
        conflict_strategy: flags.conflict,
        verbose: flags.verbose,
    };
    let outcome = engine.sync(&upstream.dir, &upstream.version, &mut state, &options)?;

    if outcome.state_updated {
        store.save(&state)?;
    }

    let synced = outcome.sync.synced_paths();
    let triggers = matching_triggers(&engine.config().triggers, &synced);
    let trigger_names: Vec<&str> = triggers.iter().map(|m| m.trigger.name.as_str()).collect();

    if flags.json {
        let report = JsonReport {
            outcome: &outcome,
            triggers: trigger_names,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_outcome(&outcome);
        if outcome.sync.dry_run {
            for name in &trigger_names {
                println!("   {} Would run trigger {}", "~".dimmed(), name.cyan());
            }
        }
    }

    if !outcome.is_success() {
        return Err(CliError::user(
            "Sync finished with errors; baseline left unchanged",
        ));
    }

    if outcome.state_updated && !triggers.is_empty() {
        let results = run_triggers(&triggers, &upstream.version, local)?;
        if !flags.json {
            for result in &results {
                println!("   {} Trigger {} finished", "+".green(), result.name.cyan());
            }
        }
    }

    Ok(())
}

fn print_outcome(outcome: &SyncOutcome) {
    let sync = &outcome.sync;
    let verb = if sync.dry_run { "Would" } else { "Did" };

    if !sync.synced.is_empty() {
        println!();
        for action in &sync.synced {
            println!(
                "   {} {} {} {}",
                "+".green(),
                verb.dimmed(),
                action.action.to_string().green(),
                action.path
            );
        }
    }

    for skipped in &sync.skipped {
        let reason = match skipped.reason {
            SkipReason::Protected => "protected",
            SkipReason::KeepLocal => "kept local",
        };
        println!("   {} {} ({})", "-".yellow(), skipped.path, reason.dimmed());
    }

    if !sync.conflicts.is_empty() {
        println!();
        println!("{} Unresolved conflicts:", "CONFLICT".red().bold());
        for path in &sync.conflicts {
            println!("   {} {}", "!".red(), path);
        }
        println!(
            "   Re-run with {} or {} to resolve.",
            "--conflict keep-local".cyan(),
            "--conflict take-upstream".cyan()
        );
    }

    for failure in &sync.backup_failures {
        println!(
            "   {} backup of {} failed: {}",
            "WARNING".yellow().bold(),
            failure.path,
            failure.message
        );
    }

    if !sync.errors.is_empty() {
        println!();
        println!("{} Could not write:", "ERROR".red().bold());
        for error in &sync.errors {
            println!("   {} {}: {}", "!".red(), error.path, error.message);
        }
    }

    if let Some(verify) = &outcome.verify {
        println!();
        if verify.passed {
            println!(
                "{} Verification passed ({} checks).",
                "OK".green().bold(),
                verify.checks.len()
            );
        } else {
            println!("{} Verification failed:", "FAILED".red().bold());
            for check in verify.failures() {
                print_failed_check(check);
            }
        }
    }

    println!();
    println!(
        "synced {}, skipped {}, conflicts {}, errors {}",
        sync.synced.len(),
        sync.skipped.len(),
        sync.conflicts.len(),
        sync.errors.len()
    );
    if let Some(dir) = &sync.backup_dir {
        println!("Backup: {}", dir.cyan());
    }
    if outcome.state_updated {
        println!("{} Baseline updated to {}.", "OK".green().bold(), outcome.version.cyan());
    }
}

fn print_failed_check(check: &CheckOutcome) {
    println!(
        "   {} [{}] {}: {}",
        "!".red(),
        check.check,
        check.path.as_deref().unwrap_or("-"),
        check.detail.as_deref().unwrap_or("")
    );
}
