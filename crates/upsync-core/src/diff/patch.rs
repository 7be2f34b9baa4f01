//! Unified text patches for previewing what a sync would change

use crate::roots::TreeRoots;
use similar::TextDiff;
use std::fs;

/// Unified diff turning the local copy of `path` into the upstream copy.
///
/// A missing local file diffs against empty content. Returns `None` when the
/// upstream file is unreadable or either side is not UTF-8 text.
pub fn unified_patch(roots: &TreeRoots, path: &str) -> Option<String> {
    let upstream = fs::read(roots.upstream_file(path)).ok()?;
    let upstream = String::from_utf8(upstream).ok()?;

    let local_path = roots.local_file(path);
    let local = if local_path.exists() {
        String::from_utf8(fs::read(&local_path).ok()?).ok()?
    } else {
        String::new()
    };

    if local == upstream {
        return Some(String::new());
    }

    let diff = TextDiff::from_lines(&local, &upstream);
    Some(
        diff.unified_diff()
            .context_radius(3)
            .header(&format!("local/{}", path), &format!("upstream/{}", path))
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn patch_shows_line_changes() {
        let upstream = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        fs::write(upstream.path().join("a.cfg"), "one\ntwo\nthree\n").unwrap();
        fs::write(local.path().join("a.cfg"), "one\n2\nthree\n").unwrap();

        let roots = TreeRoots::new(upstream.path(), local.path()).unwrap();
        let patch = unified_patch(&roots, "a.cfg").unwrap();
        assert!(patch.contains("--- local/a.cfg"));
        assert!(patch.contains("+++ upstream/a.cfg"));
        assert!(patch.contains("-2"));
        assert!(patch.contains("+two"));
    }

    #[test]
    fn added_file_diffs_against_empty() {
        let upstream = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        fs::write(upstream.path().join("new.cfg"), "hello\n").unwrap();

        let roots = TreeRoots::new(upstream.path(), local.path()).unwrap();
        let patch = unified_patch(&roots, "new.cfg").unwrap();
        assert!(patch.contains("+hello"));
    }

    #[test]
    fn binary_content_has_no_patch() {
        let upstream = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        fs::write(upstream.path().join("blob.bin"), [0xff, 0xfe, 0x00]).unwrap();

        let roots = TreeRoots::new(upstream.path(), local.path()).unwrap();
        assert!(unified_patch(&roots, "blob.bin").is_none());
    }
}
