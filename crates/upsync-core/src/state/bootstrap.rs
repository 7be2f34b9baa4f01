//! One-time baseline initialization for an untracked installation

use super::{FileRecord, Resolution, SyncState, VersionRecord};
use crate::Result;
use crate::roots::TreeRoots;
use chrono::Utc;
use upsync_fs::{DiscoveryFilter, compute_file_checksum, discover_files};

/// Outcome of [`bootstrap`]
#[derive(Debug, Clone)]
pub struct BootstrapReport {
    pub state: SyncState,
    /// Paths recorded with their local hash
    pub recorded: usize,
    /// Upstream paths absent locally, deliberately left out of the baseline
    pub upstream_only: Vec<String>,
    /// Paths that could not be hashed, with the reason
    pub errors: Vec<(String, String)>,
}

/// Build a baseline by comparing an existing local tree to the upstream
/// version it was installed from.
///
/// Every path present in both trees is recorded with its *local* hash and
/// [`Resolution::Local`], on the assumption that the local file is the
/// unmodified predecessor. Upstream-only paths are not recorded so they are
/// still classified as added on the next diff.
pub fn bootstrap(roots: &TreeRoots, version: &str, filter: &DiscoveryFilter) -> Result<BootstrapReport> {
    let upstream = discover_files(roots.upstream(), filter)?;
    let local = discover_files(roots.local(), filter)?;

    let now = Utc::now();
    let mut state = SyncState::new();
    let mut errors: Vec<(String, String)> = upstream
        .unreadable
        .into_iter()
        .chain(local.unreadable)
        .collect();
    let mut upstream_only = Vec::new();

    for path in &upstream.files {
        if !local.files.contains(path) {
            upstream_only.push(path.clone());
            continue;
        }
        match compute_file_checksum(&roots.local_file(path)) {
            Ok(hash) => {
                state.files.insert(
                    path.clone(),
                    FileRecord {
                        hash,
                        resolution: Resolution::Local,
                        synced_at: now,
                    },
                );
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Cannot hash local file during bootstrap");
                errors.push((path.clone(), e.to_string()));
            }
        }
    }

    state.last_synced_version = Some(version.to_string());
    state.last_sync_timestamp = Some(now);
    state.version_history.push(VersionRecord {
        version: version.to_string(),
        detected_at: now,
        synced_at: Some(now),
    });

    tracing::info!(
        version,
        recorded = state.files.len(),
        upstream_only = upstream_only.len(),
        "Bootstrapped baseline"
    );

    Ok(BootstrapReport {
        recorded: state.files.len(),
        state,
        upstream_only,
        errors,
    })
}
