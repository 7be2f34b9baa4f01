//! Diff command implementation

use std::path::Path;

use colored::{ColoredString, Colorize};
use upsync_core::diff::{DiffStatus, FileDiffEntry, unified_patch};
use upsync_core::SyncEngine;

use super::upstream::{report_state_warning, resolve};
use crate::cli::UpstreamArgs;
use crate::error::Result;

pub(crate) fn status_label(status: DiffStatus) -> ColoredString {
    match status {
        DiffStatus::Unchanged => "unchanged".dimmed(),
        DiffStatus::Added => "added".green(),
        DiffStatus::Modified => "modified".yellow(),
        DiffStatus::LocallyModified => "locally-modified".blue(),
        DiffStatus::Conflict => "conflict".red().bold(),
    }
}

fn print_entry(entry: &FileDiffEntry) {
    let protected = if entry.protected {
        format!(" {}", "[protected]".magenta())
    } else {
        String::new()
    };
    println!(
        "   {:<18} {}{}",
        status_label(entry.status),
        entry.path,
        protected
    );
}

/// Run the diff command
///
/// Classifies every path of the upstream and local trees against the last
/// synced baseline. Unchanged files are counted but not listed.
pub fn run_diff(local: &Path, args: &UpstreamArgs, json: bool, patch: bool) -> Result<()> {
    let engine = SyncEngine::open(local)?;
    let upstream = resolve(&engine, args)?;

    let loaded = engine.state_store().load();
    report_state_warning(&loaded);
    let report = engine.diff(&upstream.dir, &loaded.state)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} Comparing {} with {}",
        "=>".blue().bold(),
        upstream.version.cyan(),
        engine.layout().local_root().as_str().cyan()
    );

    let changed: Vec<&FileDiffEntry> = report
        .entries
        .iter()
        .filter(|e| e.status != DiffStatus::Unchanged)
        .collect();

    if changed.is_empty() {
        println!("{} No differences.", "OK".green().bold());
    } else {
        println!();
        for entry in &changed {
            print_entry(entry);
        }
    }

    if !report.local_only.is_empty() {
        println!();
        println!("{} Only in the local tree:", "LOCAL".dimmed().bold());
        for path in &report.local_only {
            println!("   {} {}", "-".dimmed(), path.dimmed());
        }
    }

    if !report.errors.is_empty() {
        println!();
        println!("{} Could not compare:", "ERROR".red().bold());
        for error in &report.errors {
            println!("   {} {}: {}", "!".red(), error.path, error.message);
        }
    }

    if patch {
        let roots = engine.roots(&upstream.dir)?;
        for entry in changed.iter().filter(|e| e.status != DiffStatus::LocallyModified) {
            match unified_patch(&roots, &entry.path) {
                Some(text) if !text.is_empty() => {
                    println!();
                    print!("{}", text);
                }
                Some(_) => {}
                None => println!("\n   {} {} (binary or unreadable)", "~".dimmed(), entry.path),
            }
        }
    }

    let s = report.summary();
    println!();
    println!(
        "{} added, {} modified, {} conflicts, {} locally modified, {} unchanged, {} protected, {} errors",
        s.added, s.modified, s.conflict, s.locally_modified, s.unchanged, s.protected, s.errors
    );
    Ok(())
}
