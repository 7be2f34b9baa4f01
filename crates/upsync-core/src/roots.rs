//! The pair of trees one invocation works on

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use upsync_fs::NormalizedPath;

/// Validated upstream and local roots
///
/// A missing or non-directory root is the one fatal condition of a run;
/// everything below the roots is handled per file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRoots {
    upstream: PathBuf,
    local: PathBuf,
}

fn validate(role: &'static str, path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(Error::InvalidRoot {
            role,
            path: path.to_path_buf(),
        });
    }
    dunce::canonicalize(path).map_err(|_| Error::InvalidRoot {
        role,
        path: path.to_path_buf(),
    })
}

impl TreeRoots {
    /// Validate both roots.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRoot`] naming the first root that is not an
    /// existing directory.
    pub fn new(upstream: impl AsRef<Path>, local: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            upstream: validate("upstream", upstream.as_ref())?,
            local: validate("local", local.as_ref())?,
        })
    }

    pub fn upstream(&self) -> &Path {
        &self.upstream
    }

    pub fn local(&self) -> &Path {
        &self.local
    }

    /// Native path of `relative` inside the upstream tree.
    pub fn upstream_file(&self, relative: &str) -> PathBuf {
        NormalizedPath::new(&self.upstream).join(relative).to_native()
    }

    /// Native path of `relative` inside the local tree.
    pub fn local_file(&self, relative: &str) -> PathBuf {
        NormalizedPath::new(&self.local).join(relative).to_native()
    }
}
