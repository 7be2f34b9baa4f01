//! Status command implementation

use std::path::Path;

use colored::Colorize;
use upsync_core::{Resolution, SyncEngine};

use super::upstream::report_state_warning;
use crate::error::Result;

/// Run the status command
///
/// Summarizes the persisted baseline: last synced version, tracked files
/// and version history.
pub fn run_status(local: &Path, json: bool) -> Result<()> {
    let engine = SyncEngine::open(local)?;
    let store = engine.state_store();
    let loaded = store.load();
    report_state_warning(&loaded);
    let state = loaded.state;

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    println!("{} upsync status", "=>".blue().bold());
    println!("   Local tree:   {}", engine.layout().local_root().as_str().cyan());

    if !store.exists() {
        println!("   Baseline:     {}", "none".yellow());
        println!();
        println!(
            "Run {} or {} to create one.",
            "upsync bootstrap".cyan(),
            "upsync sync".cyan()
        );
        return Ok(());
    }

    match &state.last_synced_version {
        Some(version) => println!("   Last synced:  {}", version.cyan()),
        None => println!("   Last synced:  {}", "never".dimmed()),
    }
    if let Some(ts) = state.last_sync_timestamp {
        println!("   At:           {}", ts.to_rfc3339());
    }

    let from_local = state
        .files
        .values()
        .filter(|r| r.resolution == Resolution::Local)
        .count();
    println!(
        "   Tracked:      {} file(s) ({} from upstream, {} kept from local)",
        state.files.len(),
        state.files.len() - from_local,
        from_local
    );

    if !state.version_history.is_empty() {
        println!();
        println!("{} Version history:", "=>".blue().bold());
        for record in &state.version_history {
            let synced = match record.synced_at {
                Some(at) => format!("synced {}", at.to_rfc3339()).green(),
                None => "detected".dimmed(),
            };
            println!(
                "   {} {} {} ({})",
                "-".dimmed(),
                record.version,
                synced,
                record.detected_at.to_rfc3339()
            );
        }
    }
    Ok(())
}
