//! Backups and restore command implementations

use std::path::Path;

use colored::Colorize;
use upsync_core::SyncEngine;

use crate::error::Result;

/// Run the backups command
pub fn run_backups(local: &Path) -> Result<()> {
    let engine = SyncEngine::open(local)?;
    let backups = engine.backup_manager().list_backups()?;

    if backups.is_empty() {
        println!("{} No backups.", "OK".green().bold());
        return Ok(());
    }

    println!("{} Backups (oldest first):", "=>".blue().bold());
    for backup in &backups {
        let version = backup
            .metadata
            .version
            .as_deref()
            .map(|v| format!(" before {}", v))
            .unwrap_or_default();
        println!(
            "   {} {}{} ({} file(s))",
            "-".dimmed(),
            backup.id.cyan(),
            version,
            backup.metadata.files.len()
        );
    }
    println!();
    println!("Run {} to restore one.", "upsync restore <id>".cyan());
    Ok(())
}

/// Run the restore command
///
/// Copies every file of the backup back over the local tree. The baseline
/// is left alone, so the restored files show up as local modifications.
pub fn run_restore(local: &Path, id: &str) -> Result<()> {
    let engine = SyncEngine::open(local)?;
    println!("{} Restoring backup {}", "=>".blue().bold(), id.cyan());

    let restored = engine.backup_manager().restore_backup(id)?;
    for path in &restored {
        println!("   {} {}", "+".green(), path);
    }
    println!("{} Restored {} file(s).", "OK".green().bold(), restored.len());
    Ok(())
}
