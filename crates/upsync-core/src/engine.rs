//! SyncEngine implementation
//!
//! The SyncEngine ties one local tree's layout and configuration to the
//! diff, sync and verify stages, and decides when the baseline may move.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use upsync_fs::NormalizedPath;

use crate::backup::BackupManager;
use crate::config::{EngineConfig, EngineLayout};
use crate::diff::{DiffEngine, DiffReport};
use crate::roots::TreeRoots;
use crate::source::{DirectorySource, UpstreamSource};
use crate::state::{BootstrapReport, StateStore, SyncState, bootstrap};
use crate::sync::{SyncExecutor, SyncOptions, SyncResult};
use crate::verify::{Verifier, VerifyResult};
use crate::{Error, Result};

/// Everything one sync invocation produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub version: String,
    pub diff: DiffReport,
    pub sync: SyncResult,
    /// Absent for dry runs
    pub verify: Option<VerifyResult>,
    /// Whether the baseline in the passed state was advanced
    pub state_updated: bool,
}

impl SyncOutcome {
    /// A run succeeded when every copy landed and every check passed.
    pub fn is_success(&self) -> bool {
        self.sync.is_success() && self.verify.as_ref().is_none_or(|v| v.passed)
    }
}

/// Engine for synchronizing a local tree with upstream releases
///
/// The SyncEngine provides the top-level operations:
/// - **diff**: Classify every path against the baseline
/// - **sync**: Apply a diff under a conflict strategy, verify, and advance
///   the baseline when allowed
/// - **bootstrap**: Create a baseline for an installation that has none
pub struct SyncEngine {
    layout: EngineLayout,
    config: EngineConfig,
}

impl SyncEngine {
    pub fn new(layout: EngineLayout, config: EngineConfig) -> Self {
        Self { layout, config }
    }

    /// Open the engine for `local_root`, loading its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `local_root` is not a directory or the config
    /// file exists but is invalid.
    pub fn open(local_root: impl AsRef<Path>) -> Result<Self> {
        let local_root = local_root.as_ref();
        let invalid = || Error::InvalidRoot {
            role: "local",
            path: local_root.to_path_buf(),
        };
        if !local_root.is_dir() {
            return Err(invalid());
        }
        let canonical = dunce::canonicalize(local_root).map_err(|_| invalid())?;
        let layout = EngineLayout::new(NormalizedPath::new(canonical));
        let config = EngineConfig::load(&layout)?;
        Ok(Self::new(layout, config))
    }

    pub fn layout(&self) -> &EngineLayout {
        &self.layout
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state_store(&self) -> StateStore {
        StateStore::new(self.layout.state_path())
    }

    pub fn backup_manager(&self) -> BackupManager {
        BackupManager::new(self.layout.local_root().clone(), self.layout.backups_dir())
    }

    /// The configured releases directory as an upstream source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when no releases directory is set.
    pub fn source(&self) -> Result<DirectorySource> {
        let configured = self
            .config
            .upstream
            .releases_dir
            .as_deref()
            .ok_or_else(|| Error::InvalidConfig {
                message: "upstream.releases_dir is not set".to_string(),
            })?;
        Ok(DirectorySource::new(
            self.layout.resolve(configured).to_native(),
        ))
    }

    /// Directory of the upstream tree for `version`
    pub fn resolve_version(&self, version: &str) -> Result<PathBuf> {
        self.source()?.resolve(version)
    }

    pub fn roots(&self, upstream: &Path) -> Result<TreeRoots> {
        TreeRoots::new(upstream, self.layout.local_root().to_native())
    }

    fn diff_engine(&self, upstream: &Path) -> Result<DiffEngine> {
        DiffEngine::from_config(self.roots(upstream)?, &self.config)
    }

    /// Classify every path of `upstream` and the local tree.
    pub fn diff(&self, upstream: &Path, state: &SyncState) -> Result<DiffReport> {
        self.diff_engine(upstream)?.compute(state)
    }

    /// Diff, sync and verify `upstream` as `version`.
    ///
    /// The baseline in `state` is advanced only for a real run whose copies
    /// all succeeded and whose verification passed. Only the synced paths
    /// are recorded; kept-local and skipped paths keep their old baseline.
    /// Persisting `state` is left to the caller.
    pub fn sync(
        &self,
        upstream: &Path,
        version: &str,
        state: &mut SyncState,
        options: &SyncOptions,
    ) -> Result<SyncOutcome> {
        let roots = self.roots(upstream)?;
        let diff = DiffEngine::from_config(roots.clone(), &self.config)?.compute(state)?;

        let executor =
            SyncExecutor::new(roots.clone(), self.layout.backups_dir()).with_version(version);
        let sync = executor.execute(&diff.entries, options);

        if sync.dry_run {
            return Ok(SyncOutcome {
                version: version.to_string(),
                diff,
                sync,
                verify: None,
                state_updated: false,
            });
        }

        let verify = Verifier::new(roots, &self.config.verify).verify(&sync.synced_paths());

        let state_updated = verify.passed && sync.is_success();
        if state_updated {
            state.apply_sync(
                version,
                sync.synced
                    .iter()
                    .filter_map(|a| Some((a.path.clone(), a.upstream_hash.clone()?))),
            );
        } else {
            tracing::warn!(
                errors = sync.errors.len(),
                verified = verify.passed,
                "Baseline left unchanged"
            );
        }

        Ok(SyncOutcome {
            version: version.to_string(),
            diff,
            sync,
            verify: Some(verify),
            state_updated,
        })
    }

    /// Build a baseline from `upstream` treated as the installed `version`.
    pub fn bootstrap(&self, upstream: &Path, version: &str) -> Result<BootstrapReport> {
        let roots = self.roots(upstream)?;
        bootstrap(&roots, version, &self.config.discovery_filter()?)
    }
}
