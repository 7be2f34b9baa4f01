//! Backups of local files overwritten by a sync
//!
//! Each sync run that overwrites at least one existing local file gets one
//! timestamped directory under `.upsync/backups/` with:
//! - metadata.toml: backup timestamp, upstream version and relative paths
//! - files/: the original files at their relative paths

mod manager;
mod session;

pub use manager::{BackupInfo, BackupManager};
pub use session::{BackupFailure, BackupMetadata, BackupSession, CompletedBackup};
