//! Forward-slash paths
//!
//! Relative paths are the keys of every diff entry, backup and persisted
//! baseline record, so they have one spelling on every platform. Conversion
//! to a native `PathBuf` happens only where a file is actually touched.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A path stored with forward slashes, without `.` segments or doubled
/// separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    inner: String,
}

fn normalize(raw: &str) -> String {
    let raw = raw.replace('\\', "/");
    let absolute = raw.starts_with('/');
    let segments: Vec<&str> = raw
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    let mut out = String::with_capacity(raw.len());
    if absolute {
        out.push('/');
    }
    out.push_str(&segments.join("/"));
    out
}

impl NormalizedPath {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            inner: normalize(&path.as_ref().to_string_lossy()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Native form for I/O
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Append a relative path, which may span several segments.
    pub fn join(&self, relative: &str) -> Self {
        if self.inner.is_empty() {
            return Self::new(relative);
        }
        Self {
            inner: normalize(&format!("{}/{}", self.inner, relative)),
        }
    }

    /// Last segment, if any
    pub fn file_name(&self) -> Option<&str> {
        self.inner.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Extension of the last segment. Dotfiles such as `.gitignore` have none.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }

    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    /// Segment-aware prefix test: `tools` covers `tools/a.cfg` but not
    /// `toolset/a.cfg`. A trailing slash on `prefix` is ignored.
    pub fn starts_with(&self, prefix: &str) -> bool {
        let prefix = normalize(prefix);
        if prefix.is_empty() {
            return true;
        }
        match self.inner.strip_prefix(prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// The forward-slash key of `path` inside `root`, or `None` for the root
/// itself and for paths outside it.
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let key = normalize(&relative.to_string_lossy());
    (!key.is_empty()).then_some(key)
}

/// Check that `path` names something inside its root.
///
/// Empty, absolute and drive-prefixed paths are rejected, as is any `..`
/// segment. Persisted relative paths go through this before they are
/// written to or read from.
pub fn validate_relative_path(path: &str) -> Result<(), String> {
    if path.trim().is_empty() {
        return Err("path must not be empty".to_string());
    }
    for component in Path::new(path).components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(format!("path '{}' escapes its root via '..'", path));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(format!("path '{}' must be relative", path));
            }
        }
    }
    Ok(())
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}
