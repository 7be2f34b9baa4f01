//! Sync result types

use crate::backup::BackupFailure;
use serde::{Deserialize, Serialize};
use std::fmt;
use upsync_fs::NormalizedPath;

/// What happens to a synced path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncActionKind {
    /// Path is new locally
    Add,
    /// Existing local path is overwritten
    Sync,
}

impl fmt::Display for SyncActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => f.write_str("add"),
            Self::Sync => f.write_str("sync"),
        }
    }
}

/// A path routed to the synced set
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyncAction {
    pub path: String,
    pub action: SyncActionKind,
    /// Upstream hash at diff time, recorded as the new baseline
    pub upstream_hash: Option<String>,
}

/// Why a path was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    Protected,
    KeepLocal,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: SkipReason,
}

/// A per-file write failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncError {
    pub path: String,
    pub message: String,
}

/// Report of one sync run
///
/// `synced`, `skipped` and `conflicts` form the planned partition and are the
/// same for a dry run and a real run with equal inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub dry_run: bool,
    pub synced: Vec<SyncAction>,
    pub skipped: Vec<SkippedEntry>,
    /// Unresolved conflicts left exactly as they were
    pub conflicts: Vec<String>,
    pub errors: Vec<SyncError>,
    /// Files that could not be backed up; the sync went ahead regardless
    pub backup_failures: Vec<BackupFailure>,
    /// Directory to restore from, when anything was backed up
    pub backup_dir: Option<String>,
}

impl SyncResult {
    /// Relative paths of everything in the synced set
    pub fn synced_paths(&self) -> Vec<&str> {
        self.synced.iter().map(|a| a.path.as_str()).collect()
    }

    pub fn skipped_paths(&self) -> Vec<&str> {
        self.skipped.iter().map(|s| s.path.as_str()).collect()
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn set_backup_dir(&mut self, dir: Option<&NormalizedPath>) {
        self.backup_dir = dir.map(|d| d.as_str().to_string());
    }
}
