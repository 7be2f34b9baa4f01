//! [`TreePair`] builder for upstream/local test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("Could not create {}: {}", parent.display(), e));
    }
    fs::write(&path, content).unwrap_or_else(|e| panic!("Could not write {}: {}", path.display(), e));
}

/// A temporary directory holding an `upstream/` tree, a `local/` tree and a
/// `releases/` directory for versioned upstream trees.
///
/// # Example
///
/// ```rust,no_run
/// use upsync_test_utils::TreePair;
///
/// let pair = TreePair::new();
/// pair.write_both("tools/a.cfg", "v1");
/// pair.write_upstream("tools/new.cfg", "fresh");
/// pair.assert_local_missing("tools/new.cfg");
/// ```
pub struct TreePair {
    temp_dir: TempDir,
}

impl Default for TreePair {
    fn default() -> Self {
        Self::new()
    }
}

impl TreePair {
    /// Create empty upstream and local trees.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("TreePair::new: failed to create temp dir");
        fs::create_dir_all(temp_dir.path().join("upstream")).unwrap();
        fs::create_dir_all(temp_dir.path().join("local")).unwrap();
        Self { temp_dir }
    }

    /// Root holding both trees.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn upstream(&self) -> PathBuf {
        self.root().join("upstream")
    }

    pub fn local(&self) -> PathBuf {
        self.root().join("local")
    }

    pub fn releases(&self) -> PathBuf {
        self.root().join("releases")
    }

    pub fn write_upstream(&self, relative: &str, content: &str) {
        write_file(&self.upstream(), relative, content);
    }

    pub fn write_local(&self, relative: &str, content: &str) {
        write_file(&self.local(), relative, content);
    }

    /// Write identical content into both trees.
    pub fn write_both(&self, relative: &str, content: &str) {
        self.write_upstream(relative, content);
        self.write_local(relative, content);
    }

    pub fn remove_local(&self, relative: &str) {
        fs::remove_file(self.local().join(relative)).unwrap();
    }

    /// Create `releases/<version>/` populated with `files`.
    pub fn add_release(&self, version: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = self.releases().join(version);
        fs::create_dir_all(&dir).unwrap();
        for (relative, content) in files {
            write_file(&dir, relative, content);
        }
        dir
    }

    /// Write `local/.upsync/config.toml`.
    pub fn configure(&self, config_toml: &str) {
        self.write_local(".upsync/config.toml", config_toml);
    }

    /// Point the local config at `releases/`, followed by `extra` lines.
    pub fn configure_releases(&self, extra: &str) {
        self.configure(&format!(
            "{}\n[upstream]\nreleases_dir = \"../releases\"\n",
            extra
        ));
    }

    pub fn read_local(&self, relative: &str) -> String {
        let path = self.local().join(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Assert that the local file at `relative` has exactly `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or differs.
    pub fn assert_local_eq(&self, relative: &str, content: &str) {
        let actual = self.read_local(relative);
        assert_eq!(
            actual, content,
            "Local file {} has unexpected content",
            relative
        );
    }

    /// Assert that `relative` does **not** exist in the local tree.
    ///
    /// # Panics
    /// Panics if the path exists.
    pub fn assert_local_missing(&self, relative: &str) {
        let full_path = self.local().join(relative);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }
}
