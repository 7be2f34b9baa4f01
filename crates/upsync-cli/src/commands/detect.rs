//! Detect command implementation

use std::path::Path;

use colored::Colorize;
use serde::Serialize;
use upsync_core::source::is_newer;
use upsync_core::{SyncEngine, UpstreamSource};

use super::upstream::report_state_warning;
use crate::error::Result;

#[derive(Debug, Serialize)]
struct DetectedVersion {
    version: String,
    /// Sorts after the last synced version
    newer: bool,
    /// First time this version was seen
    new: bool,
}

#[derive(Debug, Serialize)]
struct DetectReport {
    last_synced_version: Option<String>,
    versions: Vec<DetectedVersion>,
}

/// Run the detect command
///
/// Lists the versions in the releases directory and records every version
/// newer than the last sync in the version history.
pub fn run_detect(local: &Path, json: bool) -> Result<()> {
    let engine = SyncEngine::open(local)?;
    let source = engine.source()?;
    let versions = source.versions()?;

    let store = engine.state_store();
    let loaded = store.load();
    report_state_warning(&loaded);
    let mut state = loaded.state;
    let last = state.last_synced_version.clone();

    let mut report = DetectReport {
        last_synced_version: last.clone(),
        versions: Vec::new(),
    };
    let mut recorded = 0;
    for version in versions {
        let newer = last.as_deref().is_none_or(|l| is_newer(&version, l));
        let new = newer && state.record_detected(&version);
        if new {
            recorded += 1;
        }
        report.versions.push(DetectedVersion {
            version,
            newer,
            new,
        });
    }

    if recorded > 0 {
        store.save(&state)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} Releases in {}",
        "=>".blue().bold(),
        source.root().display().to_string().cyan()
    );
    if report.versions.is_empty() {
        println!("   {}", "(none)".dimmed());
        return Ok(());
    }
    match &report.last_synced_version {
        Some(v) => println!("   Last synced: {}", v.cyan()),
        None => println!("   Last synced: {}", "never".dimmed()),
    }
    println!();
    for v in &report.versions {
        let marker = if v.new {
            "NEW".green().bold().to_string()
        } else if v.newer {
            "newer".green().to_string()
        } else {
            String::new()
        };
        println!("   {} {} {}", "-".dimmed(), v.version, marker);
    }

    let newer = report.versions.iter().filter(|v| v.newer).count();
    println!();
    if newer == 0 {
        println!("{} Up to date.", "OK".green().bold());
    } else {
        println!(
            "{} {} newer version(s); {} recorded for the first time.",
            "=>".blue().bold(),
            newer,
            recorded
        );
    }
    Ok(())
}
