//! Tree discovery
//!
//! Enumerates the regular files of a tree as relative, forward-slash paths
//! and computes the union of two trees' listings.

use crate::path::relative_key;
use crate::{Error, Result};
use glob::{MatchOptions, Pattern};
use std::collections::BTreeSet;
use std::path::Path;
use walkdir::WalkDir;

/// Directory names that are never part of a synchronized tree.
pub const ALWAYS_EXCLUDED_DIRS: &[&str] = &[".git", ".upsync"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A compiled list of glob patterns matched against relative paths.
///
/// `*` stays within one path segment, `**` spans segments.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Compile `patterns`, failing on the first invalid one.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|raw| {
                let raw = raw.as_ref();
                Pattern::new(raw).map_err(|e| Error::InvalidPattern {
                    pattern: raw.to_string(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Returns true if any pattern matches `relative_path`.
    pub fn matches(&self, relative_path: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_with(relative_path, MATCH_OPTIONS))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The source text of each pattern.
    pub fn as_strs(&self) -> Vec<&str> {
        self.patterns.iter().map(Pattern::as_str).collect()
    }
}

/// Decides which paths discovery skips.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryFilter {
    exclude: PatternSet,
}

impl DiscoveryFilter {
    pub fn new(exclude: PatternSet) -> Self {
        Self { exclude }
    }

    fn skips_dir(&self, name: &str, relative: &str) -> bool {
        ALWAYS_EXCLUDED_DIRS.contains(&name) || self.exclude.matches(relative)
    }

    fn skips_file(&self, relative: &str) -> bool {
        self.exclude.matches(relative)
    }
}

/// Result of listing one tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeListing {
    /// Relative paths of regular files
    pub files: BTreeSet<String>,
    /// Entries that could not be read, with the reason
    pub unreadable: Vec<(String, String)>,
}

/// List every regular file under `root`.
///
/// Unreadable entries below the root are collected rather than aborting the
/// walk. Symlinks are not followed, but a symlink that points at a file is
/// listed like a file.
///
/// # Errors
///
/// Returns an error only if `root` itself is not a readable directory.
pub fn discover_files(root: &Path, filter: &DiscoveryFilter) -> Result<TreeListing> {
    if !root.is_dir() {
        return Err(Error::Walk {
            path: root.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let mut listing = TreeListing::default();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            match relative_key(root, entry.path()) {
                Some(rel) => !filter.skips_dir(&name, &rel),
                None => true,
            }
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                if e.depth() == 0 {
                    return Err(Error::Walk {
                        path: root.to_path_buf(),
                        message: e.to_string(),
                    });
                }
                let key = e
                    .path()
                    .and_then(|p| relative_key(root, p))
                    .unwrap_or_else(|| "<unknown>".to_string());
                tracing::warn!(path = %key, error = %e, "Skipping unreadable entry");
                listing.unreadable.push((key, e.to_string()));
                continue;
            }
        };

        let file_type = entry.file_type();
        let is_file =
            file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }

        if let Some(key) = relative_key(root, entry.path())
            && !filter.skips_file(&key)
        {
            listing.files.insert(key);
        }
    }

    tracing::debug!(root = %root.display(), files = listing.files.len(), "Discovered tree");
    Ok(listing)
}

/// Union of the relative paths present in two trees.
pub fn discover_union(
    upstream: &Path,
    local: &Path,
    filter: &DiscoveryFilter,
) -> Result<(TreeListing, TreeListing, BTreeSet<String>)> {
    let upstream_listing = discover_files(upstream, filter)?;
    let local_listing = discover_files(local, filter)?;
    let union = upstream_listing
        .files
        .union(&local_listing.files)
        .cloned()
        .collect();
    Ok((upstream_listing, local_listing, union))
}
