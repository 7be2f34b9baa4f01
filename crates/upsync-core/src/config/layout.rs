//! Paths the engine owns inside the local tree

use upsync_fs::NormalizedPath;

/// Directory holding engine config, state and backups.
pub const CONFIG_DIR: &str = ".upsync";

/// Resolves the engine's own files relative to a local root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineLayout {
    root: NormalizedPath,
}

impl EngineLayout {
    pub fn new(local_root: NormalizedPath) -> Self {
        Self { root: local_root }
    }

    pub fn local_root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn config_dir(&self) -> NormalizedPath {
        self.root.join(CONFIG_DIR)
    }

    pub fn config_path(&self) -> NormalizedPath {
        self.config_dir().join("config.toml")
    }

    pub fn state_path(&self) -> NormalizedPath {
        self.config_dir().join("state.toml")
    }

    pub fn backups_dir(&self) -> NormalizedPath {
        self.config_dir().join("backups")
    }

    /// Resolve a configured path: absolute paths are kept, relative ones are
    /// taken from the local root.
    pub fn resolve(&self, configured: &str) -> NormalizedPath {
        if std::path::Path::new(configured).is_absolute() {
            NormalizedPath::new(configured)
        } else {
            self.root.join(configured)
        }
    }
}
