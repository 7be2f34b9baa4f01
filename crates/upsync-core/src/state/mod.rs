//! Baseline state for three-way change detection
//!
//! [`SyncState`] records, per relative path, the hash that was known to be in
//! sync after the last verified run. It is the common ancestor the diff
//! engine compares upstream and local content against. Callers own loading
//! and saving through [`StateStore`]; the engine only ever receives the state
//! as an explicit value.

mod bootstrap;
mod store;

pub use bootstrap::{BootstrapReport, bootstrap};
pub use store::{LoadedState, StateStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which side the stored baseline hash was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Hash of the upstream file that was copied in
    Upstream,
    /// Hash of the local file that was kept (bootstrap)
    Local,
}

/// Baseline entry for one path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub hash: String,
    pub resolution: Resolution,
    pub synced_at: DateTime<Utc>,
}

/// One upstream version seen by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: String,
    pub detected_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<DateTime<Utc>>,
}

/// Durable record of what was last known to be in sync
///
/// Invariant: a path is only present in `files` if it existed in both trees
/// when it was compared, or was copied from upstream and verified. Recording
/// an upstream-only path would hide it from ever being classified as added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    /// State format version for forward compatibility
    version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub files: BTreeMap<String, FileRecord>,
    /// Append-only audit trail
    #[serde(default)]
    pub version_history: Vec<VersionRecord>,
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncState {
    /// Create an empty state with no baseline
    pub fn new() -> Self {
        Self {
            version: "1.0".to_string(),
            last_synced_version: None,
            last_sync_timestamp: None,
            files: BTreeMap::new(),
            version_history: Vec::new(),
        }
    }

    /// Returns true if no baseline has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Baseline hash for `path`, if one was ever recorded
    pub fn baseline_hash(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(|record| record.hash.as_str())
    }

    /// Record a verified sync of `version`.
    ///
    /// `synced` yields `(path, upstream_hash)` pairs; the upstream hash is
    /// stored rather than re-reading local content.
    pub fn apply_sync<I, P, H>(&mut self, version: &str, synced: I)
    where
        I: IntoIterator<Item = (P, H)>,
        P: Into<String>,
        H: Into<String>,
    {
        let now = Utc::now();
        for (path, hash) in synced {
            self.files.insert(
                path.into(),
                FileRecord {
                    hash: hash.into(),
                    resolution: Resolution::Upstream,
                    synced_at: now,
                },
            );
        }
        self.last_synced_version = Some(version.to_string());
        self.last_sync_timestamp = Some(now);
        self.mark_version_synced(version, now);
    }

    /// Note that `version` was seen upstream.
    ///
    /// Returns true if this added a new history entry.
    pub fn record_detected(&mut self, version: &str) -> bool {
        if self.version_history.iter().any(|r| r.version == version) {
            return false;
        }
        self.version_history.push(VersionRecord {
            version: version.to_string(),
            detected_at: Utc::now(),
            synced_at: None,
        });
        true
    }

    fn mark_version_synced(&mut self, version: &str, at: DateTime<Utc>) {
        match self
            .version_history
            .iter_mut()
            .find(|r| r.version == version)
        {
            Some(record) => record.synced_at = Some(at),
            None => self.version_history.push(VersionRecord {
                version: version.to_string(),
                detected_at: at,
                synced_at: Some(at),
            }),
        }
    }
}
