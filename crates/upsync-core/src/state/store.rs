//! Persistence for [`SyncState`]

use super::SyncState;
use crate::Result;
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use upsync_fs::NormalizedPath;

/// Result of loading the state file
#[derive(Debug, Clone)]
pub struct LoadedState {
    pub state: SyncState,
    /// Set when an existing file could not be used and an empty state was
    /// substituted
    pub warning: Option<String>,
}

/// Reads and writes the persisted state file
#[derive(Debug, Clone)]
pub struct StateStore {
    path: NormalizedPath,
}

impl StateStore {
    pub fn new(path: NormalizedPath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn lock_path(&self) -> PathBuf {
        self.path.to_native().with_extension("toml.lock")
    }

    /// Load the state, degrading to an empty baseline.
    ///
    /// A missing file is a normal first run. An unreadable or unparseable
    /// file is logged and treated the same way rather than failing, which
    /// makes the next run behave like a bootstrap.
    pub fn load(&self) -> LoadedState {
        if !self.exists() {
            return LoadedState {
                state: SyncState::new(),
                warning: None,
            };
        }

        match self.try_load() {
            Ok(state) => LoadedState {
                state,
                warning: None,
            },
            Err(e) => {
                let warning = format!(
                    "State file {} is unusable ({}); continuing without a baseline",
                    self.path, e
                );
                tracing::warn!("{}", warning);
                LoadedState {
                    state: SyncState::new(),
                    warning: Some(warning),
                }
            }
        }
    }

    /// Load the state, failing on any read or parse error.
    pub fn try_load(&self) -> Result<SyncState> {
        let content = fs::read_to_string(self.path.to_native())?;
        let state: SyncState = toml::from_str(&content)?;
        Ok(state)
    }

    /// Save the state atomically under an exclusive lock
    ///
    /// Uses write-to-temp-then-rename so a crash mid-write leaves the
    /// previous baseline intact.
    pub fn save(&self, state: &SyncState) -> Result<()> {
        let path = self.path.to_native();
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(state)?;

        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path())?;

        // Blocks if another process holds the lock
        lock_file.lock_exclusive()?;

        let temp_path = temp_path_for(&path);
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!(path = %self.path, files = state.files.len(), "Saved sync state");
        // Lock released when lock_file is dropped
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    path.with_extension("toml.tmp")
}
