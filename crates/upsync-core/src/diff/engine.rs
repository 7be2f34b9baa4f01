//! DiffEngine implementation
//!
//! Hashes every path of the upstream/local union and classifies it against
//! the baseline recorded in [`SyncState`].

use super::entry::{DiffError, DiffReport, DiffStatus, FileDiffEntry};
use crate::Result;
use crate::config::EngineConfig;
use crate::roots::TreeRoots;
use crate::state::SyncState;
use upsync_fs::{DiscoveryFilter, PatternSet, compute_file_checksum, discover_union};

/// Outcome of classifying one path from its three hashes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Present only locally; outside upstream's scope
    LocalOnly,
    Entry {
        status: DiffStatus,
        locally_modified: bool,
    },
}

/// Classify a path from its upstream, local and baseline hashes.
///
/// Rules, in order:
/// 1. absent upstream -> [`Classification::LocalOnly`]
/// 2. absent locally and never recorded -> added
/// 3. never recorded but present in both trees -> the local hash stands in
///    for the baseline
/// 4. otherwise compare each side against the baseline
///
/// Returns the classification together with the effective baseline.
pub fn classify<'a>(
    upstream: Option<&'a str>,
    local: Option<&'a str>,
    baseline: Option<&'a str>,
) -> (Classification, Option<&'a str>) {
    let Some(upstream) = upstream else {
        return (Classification::LocalOnly, baseline);
    };

    if local.is_none() && baseline.is_none() {
        return (
            Classification::Entry {
                status: DiffStatus::Added,
                locally_modified: false,
            },
            None,
        );
    }

    let baseline = baseline.or(local);
    let locally_modified = local != baseline;
    let upstream_changed = Some(upstream) != baseline;

    let status = match (upstream_changed, locally_modified) {
        (false, false) => DiffStatus::Unchanged,
        (true, false) => DiffStatus::Modified,
        (false, true) => DiffStatus::LocallyModified,
        (true, true) => DiffStatus::Conflict,
    };

    (
        Classification::Entry {
            status,
            locally_modified,
        },
        baseline,
    )
}

/// Compares an upstream tree with a local tree
pub struct DiffEngine {
    roots: TreeRoots,
    protection: PatternSet,
    filter: DiscoveryFilter,
}

impl DiffEngine {
    pub fn new(roots: TreeRoots, protection: PatternSet, filter: DiscoveryFilter) -> Self {
        Self {
            roots,
            protection,
            filter,
        }
    }

    /// Build an engine using the protection and exclude patterns of `config`.
    pub fn from_config(roots: TreeRoots, config: &EngineConfig) -> Result<Self> {
        Ok(Self::new(
            roots,
            config.protection_patterns()?,
            config.discovery_filter()?,
        ))
    }

    pub fn roots(&self) -> &TreeRoots {
        &self.roots
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.protection.matches(path)
    }

    /// Classify every path of both trees.
    ///
    /// A file that cannot be hashed is reported in [`DiffReport::errors`] and
    /// produces no entry; the rest of the run continues.
    ///
    /// # Errors
    ///
    /// Fails only if either root cannot be listed at all.
    pub fn compute(&self, state: &SyncState) -> Result<DiffReport> {
        let (upstream, local, union) =
            discover_union(self.roots.upstream(), self.roots.local(), &self.filter)?;

        let mut report = DiffReport::default();
        for (path, message) in upstream.unreadable.into_iter().chain(local.unreadable) {
            report.errors.push(DiffError { path, message });
        }

        for path in union {
            let in_upstream = upstream.files.contains(&path);
            let in_local = local.files.contains(&path);

            if !in_upstream {
                report.local_only.push(path);
                continue;
            }

            let upstream_hash = match compute_file_checksum(&self.roots.upstream_file(&path)) {
                Ok(hash) => hash,
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "Cannot hash upstream file");
                    report.errors.push(DiffError {
                        path,
                        message: format!("upstream: {}", e),
                    });
                    continue;
                }
            };

            let local_hash = if in_local {
                match compute_file_checksum(&self.roots.local_file(&path)) {
                    Ok(hash) => Some(hash),
                    Err(e) => {
                        tracing::warn!(path = %path, error = %e, "Cannot hash local file");
                        report.errors.push(DiffError {
                            path,
                            message: format!("local: {}", e),
                        });
                        continue;
                    }
                }
            } else {
                None
            };

            let (classification, baseline) = classify(
                Some(upstream_hash.as_str()),
                local_hash.as_deref(),
                state.baseline_hash(&path),
            );

            let Classification::Entry {
                status,
                locally_modified,
            } = classification
            else {
                continue;
            };

            let baseline_hash = baseline.map(str::to_string);
            let protected = self.is_protected(&path);
            tracing::debug!(path = %path, %status, protected, "Classified");

            report.entries.push(FileDiffEntry {
                path,
                status,
                protected,
                locally_modified,
                upstream_hash: Some(upstream_hash),
                local_hash,
                baseline_hash,
            });
        }

        Ok(report)
    }
}
