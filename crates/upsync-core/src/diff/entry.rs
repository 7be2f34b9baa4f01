//! Diff report types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of one path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffStatus {
    /// Neither side changed since the baseline
    Unchanged,
    /// New upstream, absent locally and never recorded
    Added,
    /// Upstream changed, local still matches the baseline
    Modified,
    /// Only local changed; informational, nothing to do
    LocallyModified,
    /// Both sides diverged from the baseline
    Conflict,
}

impl DiffStatus {
    /// Whether the sync executor considers entries with this status at all
    pub fn is_candidate(self) -> bool {
        matches!(self, Self::Added | Self::Modified | Self::Conflict)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Added => "added",
            Self::Modified => "modified",
            Self::LocallyModified => "locally-modified",
            Self::Conflict => "conflict",
        }
    }
}

impl fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row per relative path present upstream (and possibly locally)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiffEntry {
    pub path: String,
    pub status: DiffStatus,
    /// Matches a protection pattern; never mutated automatically
    pub protected: bool,
    /// Local content differs from the baseline
    pub locally_modified: bool,
    pub upstream_hash: Option<String>,
    pub local_hash: Option<String>,
    /// Baseline used for classification (local hash on first comparison)
    pub baseline_hash: Option<String>,
}

/// A path that could not be classified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffError {
    pub path: String,
    pub message: String,
}

/// Counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub unchanged: usize,
    pub added: usize,
    pub modified: usize,
    pub locally_modified: usize,
    pub conflict: usize,
    pub protected: usize,
    pub local_only: usize,
    pub errors: usize,
}

/// Full result of comparing two trees against a baseline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffReport {
    /// Sorted by path
    pub entries: Vec<FileDiffEntry>,
    /// Paths that exist only locally; reported for visibility, never acted on
    pub local_only: Vec<String>,
    pub errors: Vec<DiffError>,
}

impl DiffReport {
    /// Entries the executor will route (added, modified, conflict)
    pub fn actionable(&self) -> impl Iterator<Item = &FileDiffEntry> {
        self.entries.iter().filter(|e| e.status.is_candidate())
    }

    pub fn with_status(&self, status: DiffStatus) -> impl Iterator<Item = &FileDiffEntry> {
        self.entries.iter().filter(move |e| e.status == status)
    }

    pub fn get(&self, path: &str) -> Option<&FileDiffEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    pub fn has_changes(&self) -> bool {
        self.actionable().next().is_some()
    }

    pub fn summary(&self) -> DiffSummary {
        let mut summary = DiffSummary {
            local_only: self.local_only.len(),
            errors: self.errors.len(),
            ..DiffSummary::default()
        };
        for entry in &self.entries {
            match entry.status {
                DiffStatus::Unchanged => summary.unchanged += 1,
                DiffStatus::Added => summary.added += 1,
                DiffStatus::Modified => summary.modified += 1,
                DiffStatus::LocallyModified => summary.locally_modified += 1,
                DiffStatus::Conflict => summary.conflict += 1,
            }
            if entry.protected {
                summary.protected += 1;
            }
        }
        summary
    }
}
