//! Atomic I/O operations with file locking

use crate::{Error, NormalizedPath, Result};
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Temp file next to `target` so the final rename stays on one filesystem.
fn temp_sibling(target: &Path) -> PathBuf {
    let temp_name = format!(
        ".{}.{}.tmp",
        target
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    target.with_file_name(temp_name)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    Ok(())
}

/// Move a fully written temp file over `dest`, removing it on failure.
fn commit(temp_path: &Path, dest: &Path) -> Result<()> {
    fs::rename(temp_path, dest).map_err(|e| {
        let _ = fs::remove_file(temp_path);
        Error::io(dest, e)
    })
}

/// Replace `path` with `content` in one step.
///
/// Bytes go to a temp sibling held under an exclusive `fs2` lock and synced
/// to disk before the rename, so readers see the old file or the new one.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let dest = path.to_native();
    ensure_parent(&dest)?;

    let temp_path = temp_sibling(&dest);
    let mut temp = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    let locked = || Error::LockFailed { path: dest.clone() };
    temp.lock_exclusive().map_err(|_| locked())?;
    temp.write_all(content)
        .and_then(|()| temp.sync_all())
        .map_err(|e| Error::io(&temp_path, e))?;
    temp.unlock().map_err(|_| locked())?;
    drop(temp);

    commit(&temp_path, &dest)
}

/// Copy `source` over `dest` atomically, creating parent directories.
///
/// The copy lands in a temp sibling first and is renamed into place, so a
/// failed copy never leaves a truncated destination. Permissions follow
/// the source file (hook scripts keep their executable bit).
pub fn copy_atomic(source: &Path, dest: &Path) -> Result<()> {
    ensure_parent(dest)?;

    let temp_path = temp_sibling(dest);
    if let Err(e) = fs::copy(source, &temp_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(source, e));
    }

    commit(&temp_path, dest)
}

/// Read a UTF-8 file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// [`write_atomic`] for text.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}
