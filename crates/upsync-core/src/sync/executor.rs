//! SyncExecutor implementation
//!
//! Routes classified entries into synced / skipped / conflicts, backs up
//! every local file about to be overwritten, then copies upstream files in.

use super::options::{ConflictStrategy, SyncOptions};
use super::report::{SkipReason, SkippedEntry, SyncAction, SyncActionKind, SyncError, SyncResult};
use crate::backup::BackupSession;
use crate::diff::{DiffStatus, FileDiffEntry};
use crate::roots::TreeRoots;
use upsync_fs::{NormalizedPath, io};

/// The routing of a diff under one conflict strategy
///
/// Depends only on the entries and the strategy, which is what makes a dry
/// run a faithful preview of a real run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub synced: Vec<SyncAction>,
    pub skipped: Vec<SkippedEntry>,
    pub conflicts: Vec<String>,
}

impl SyncPlan {
    /// Route `entries` under `strategy`.
    ///
    /// Only added, modified and conflicting entries are considered.
    /// Protected entries are always skipped. Conflicts follow the strategy;
    /// everything else is synced.
    pub fn build(entries: &[FileDiffEntry], strategy: ConflictStrategy) -> Self {
        let mut plan = Self::default();

        for entry in entries.iter().filter(|e| e.status.is_candidate()) {
            if entry.protected {
                plan.skipped.push(SkippedEntry {
                    path: entry.path.clone(),
                    reason: SkipReason::Protected,
                });
                continue;
            }

            if entry.status == DiffStatus::Conflict || entry.locally_modified {
                match strategy {
                    ConflictStrategy::KeepLocal => {
                        plan.skipped.push(SkippedEntry {
                            path: entry.path.clone(),
                            reason: SkipReason::KeepLocal,
                        });
                        continue;
                    }
                    ConflictStrategy::Skip => {
                        plan.conflicts.push(entry.path.clone());
                        continue;
                    }
                    ConflictStrategy::TakeUpstream => {}
                }
            }

            let action = if entry.local_hash.is_some() {
                SyncActionKind::Sync
            } else {
                SyncActionKind::Add
            };
            plan.synced.push(SyncAction {
                path: entry.path.clone(),
                action,
                upstream_hash: entry.upstream_hash.clone(),
            });
        }

        plan
    }
}

/// Applies a diff to the local tree
pub struct SyncExecutor {
    roots: TreeRoots,
    backups_dir: NormalizedPath,
    version: Option<String>,
}

impl SyncExecutor {
    /// Create an executor writing backups under `backups_dir`
    pub fn new(roots: TreeRoots, backups_dir: NormalizedPath) -> Self {
        Self {
            roots,
            backups_dir,
            version: None,
        }
    }

    /// Record `version` in backup metadata
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Run the sync.
    ///
    /// In dry-run mode only the plan is reported. Otherwise every existing
    /// local file in the synced set is backed up before the first copy, and
    /// copy failures are collected per file without stopping the run. A
    /// failed copy stays in `synced` and is also listed in `errors`.
    pub fn execute(&self, entries: &[FileDiffEntry], options: &SyncOptions) -> SyncResult {
        let plan = SyncPlan::build(entries, options.conflict_strategy);

        for skipped in &plan.skipped {
            tracing::info!(path = %skipped.path, reason = ?skipped.reason, "Skipped");
        }
        for conflict in &plan.conflicts {
            tracing::info!(path = %conflict, "Unresolved conflict left untouched");
        }

        let mut result = SyncResult {
            dry_run: options.dry_run,
            synced: plan.synced,
            skipped: plan.skipped,
            conflicts: plan.conflicts,
            ..SyncResult::default()
        };

        if options.dry_run {
            for action in &result.synced {
                log_action(options.verbose, "[dry-run] Would", action);
            }
            return result;
        }

        let mut session = BackupSession::begin(&self.backups_dir, self.version.as_deref());
        for action in &result.synced {
            if self.roots.local_file(&action.path).exists() {
                session.backup(self.roots.local(), &action.path);
            }
        }
        let backup = session.finish();
        result.set_backup_dir(backup.dir.as_ref());
        result.backup_failures = backup.failures;

        for action in &result.synced {
            let source = self.roots.upstream_file(&action.path);
            let dest = self.roots.local_file(&action.path);
            match io::copy_atomic(&source, &dest) {
                Ok(()) => log_action(options.verbose, "Applied", action),
                Err(e) => {
                    tracing::warn!(path = %action.path, error = %e, "Copy failed");
                    result.errors.push(SyncError {
                        path: action.path.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            synced = result.synced.len(),
            skipped = result.skipped.len(),
            conflicts = result.conflicts.len(),
            errors = result.errors.len(),
            "Sync finished"
        );
        result
    }
}

fn log_action(verbose: bool, prefix: &str, action: &SyncAction) {
    if verbose {
        tracing::info!("{} {} {}", prefix, action.action, action.path);
    } else {
        tracing::debug!("{} {} {}", prefix, action.action, action.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(path: &str, status: DiffStatus, protected: bool, local: bool) -> FileDiffEntry {
        FileDiffEntry {
            path: path.to_string(),
            status,
            protected,
            locally_modified: matches!(status, DiffStatus::Conflict | DiffStatus::LocallyModified),
            upstream_hash: Some(format!("sha256:{}", path)),
            local_hash: local.then(|| "sha256:local".to_string()),
            baseline_hash: None,
        }
    }

    fn sample() -> Vec<FileDiffEntry> {
        vec![
            entry("added.cfg", DiffStatus::Added, false, false),
            entry("conflict.cfg", DiffStatus::Conflict, false, true),
            entry("local.cfg", DiffStatus::LocallyModified, false, true),
            entry("modified.cfg", DiffStatus::Modified, false, true),
            entry("protected.cfg", DiffStatus::Modified, true, true),
            entry("protected-conflict.cfg", DiffStatus::Conflict, true, true),
            entry("same.cfg", DiffStatus::Unchanged, false, true),
        ]
    }

    fn synced(plan: &SyncPlan) -> Vec<&str> {
        plan.synced.iter().map(|a| a.path.as_str()).collect()
    }

    fn skipped(plan: &SyncPlan) -> Vec<&str> {
        plan.skipped.iter().map(|s| s.path.as_str()).collect()
    }

    #[test]
    fn skip_strategy_reports_conflicts() {
        let plan = SyncPlan::build(&sample(), ConflictStrategy::Skip);
        assert_eq!(synced(&plan), vec!["added.cfg", "modified.cfg"]);
        assert_eq!(skipped(&plan), vec!["protected.cfg", "protected-conflict.cfg"]);
        assert_eq!(plan.conflicts, vec!["conflict.cfg"]);
    }

    #[test]
    fn keep_local_skips_conflicts() {
        let plan = SyncPlan::build(&sample(), ConflictStrategy::KeepLocal);
        assert_eq!(synced(&plan), vec!["added.cfg", "modified.cfg"]);
        assert_eq!(
            skipped(&plan),
            vec!["conflict.cfg", "protected.cfg", "protected-conflict.cfg"]
        );
        assert!(plan.conflicts.is_empty());
    }

    #[test]
    fn take_upstream_syncs_conflicts_but_never_protected() {
        let plan = SyncPlan::build(&sample(), ConflictStrategy::TakeUpstream);
        assert_eq!(synced(&plan), vec!["added.cfg", "conflict.cfg", "modified.cfg"]);
        assert_eq!(skipped(&plan), vec!["protected.cfg", "protected-conflict.cfg"]);
        assert!(plan.conflicts.is_empty());
    }

    #[test]
    fn action_kind_follows_local_presence() {
        let plan = SyncPlan::build(&sample(), ConflictStrategy::TakeUpstream);
        assert_eq!(plan.synced[0].action, SyncActionKind::Add);
        assert_eq!(plan.synced[1].action, SyncActionKind::Sync);
    }

    #[test]
    fn informational_entries_are_in_no_list() {
        for strategy in [
            ConflictStrategy::Skip,
            ConflictStrategy::KeepLocal,
            ConflictStrategy::TakeUpstream,
        ] {
            let plan = SyncPlan::build(&sample(), strategy);
            let all: Vec<&str> = synced(&plan)
                .into_iter()
                .chain(skipped(&plan))
                .chain(plan.conflicts.iter().map(String::as_str))
                .collect();
            assert!(!all.contains(&"local.cfg"));
            assert!(!all.contains(&"same.cfg"));
        }
    }
}
