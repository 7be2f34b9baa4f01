//! Upstream release supply
//!
//! Obtaining a release (download, checkout) happens outside the engine; a
//! source only enumerates releases already on disk and resolves one to the
//! directory that serves as the upstream tree.

use crate::{Error, Result};
use semver::Version;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

/// Something that can list and locate upstream versions
pub trait UpstreamSource {
    /// Available versions, oldest first
    fn versions(&self) -> Result<Vec<String>>;

    /// Directory holding the upstream tree for `version`
    fn resolve(&self, version: &str) -> Result<PathBuf>;

    /// The newest available version, if any
    fn latest(&self) -> Result<Option<String>> {
        Ok(self.versions()?.pop())
    }
}

/// Parse a version label, tolerating a leading `v`
pub fn parse_version(label: &str) -> Option<Version> {
    let trimmed = label.strip_prefix('v').unwrap_or(label);
    Version::parse(trimmed).ok()
}

/// Order version labels: semver where both parse, semver before free-form
/// labels, and lexical order otherwise.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (parse_version(a), parse_version(b)) {
        (Some(va), Some(vb)) => va.cmp(&vb).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.cmp(b),
    }
}

/// True when `candidate` sorts after `current`
pub fn is_newer(candidate: &str, current: &str) -> bool {
    match (parse_version(candidate), parse_version(current)) {
        (Some(c), Some(v)) => c > v,
        _ => compare_versions(candidate, current) == Ordering::Greater,
    }
}

/// A releases directory with one subdirectory per version
///
/// ```text
/// releases/
///   v1.2.0/
///   v1.3.0/
/// ```
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl UpstreamSource for DirectorySource {
    fn versions(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(Error::InvalidRoot {
                role: "releases",
                path: self.root.clone(),
            });
        }

        let mut versions = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            versions.push(name);
        }

        versions.sort_by(|a, b| compare_versions(a, b));
        tracing::debug!(root = %self.root.display(), count = versions.len(), "Listed releases");
        Ok(versions)
    }

    fn resolve(&self, version: &str) -> Result<PathBuf> {
        let not_found = || Error::VersionNotFound {
            version: version.to_string(),
        };
        if version.is_empty() || version.contains(['/', '\\']) || version == ".." {
            return Err(not_found());
        }

        let direct = self.root.join(version);
        if direct.is_dir() {
            return Ok(direct);
        }

        // Accept "1.2.0" for a "v1.2.0" directory and the reverse
        let wanted = parse_version(version).ok_or_else(not_found)?;
        self.versions()?
            .into_iter()
            .find(|label| parse_version(label).as_ref() == Some(&wanted))
            .map(|label| self.root.join(label))
            .ok_or_else(not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    fn releases(names: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for name in names {
            fs::create_dir_all(temp.path().join(name)).unwrap();
        }
        temp
    }

    #[test]
    fn versions_are_sorted_semantically() {
        let temp = releases(&["v1.10.0", "v1.2.0", "1.9.1", "nightly"]);
        fs::write(temp.path().join("NOTES.txt"), "").unwrap();

        let source = DirectorySource::new(temp.path());
        assert_eq!(
            source.versions().unwrap(),
            vec!["nightly", "v1.2.0", "1.9.1", "v1.10.0"]
        );
        assert_eq!(source.latest().unwrap().as_deref(), Some("v1.10.0"));
    }

    #[test]
    fn resolves_with_or_without_prefix() {
        let temp = releases(&["v2.0.0"]);
        let source = DirectorySource::new(temp.path());

        assert!(source.resolve("v2.0.0").unwrap().ends_with("v2.0.0"));
        assert!(source.resolve("2.0.0").unwrap().ends_with("v2.0.0"));
        assert!(matches!(
            source.resolve("3.0.0"),
            Err(Error::VersionNotFound { .. })
        ));
    }

    #[test]
    fn rejects_path_like_versions() {
        let temp = releases(&["v1.0.0"]);
        let source = DirectorySource::new(temp.path().join("v1.0.0"));
        assert!(source.resolve("..").is_err());
        assert!(source.resolve("../v1.0.0").is_err());
    }

    #[test]
    fn missing_releases_dir_is_invalid_root() {
        let temp = TempDir::new().unwrap();
        let source = DirectorySource::new(temp.path().join("absent"));
        assert!(matches!(
            source.versions(),
            Err(Error::InvalidRoot { role: "releases", .. })
        ));
    }

    #[rstest]
    #[case("v1.3.0", "1.2.9", true)]
    #[case("1.2.0", "v1.2.0", false)]
    #[case("v1.2.0", "1.2.0", false)]
    #[case("2.0.0-rc.1", "2.0.0", false)]
    #[case("b", "a", true)]
    #[case("1.0.0", "nightly", true)]
    fn newer_comparison(#[case] candidate: &str, #[case] current: &str, #[case] expected: bool) {
        assert_eq!(is_newer(candidate, current), expected);
    }
}
