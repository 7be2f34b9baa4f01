//! Listing and restoring backups

use super::session::{BackupMetadata, FILES_DIR, METADATA_FILE};
use crate::{Error, Result};
use std::fs;
use upsync_fs::{NormalizedPath, io, validate_relative_path};

/// A backup found on disk
#[derive(Debug, Clone)]
pub struct BackupInfo {
    /// Directory name, used to select a backup for restore
    pub id: String,
    pub path: NormalizedPath,
    pub metadata: BackupMetadata,
}

/// Manages the backups of one local tree
pub struct BackupManager {
    /// Root of the local tree
    root: NormalizedPath,
    /// Path to backups directory (.upsync/backups)
    backups_dir: NormalizedPath,
}

impl BackupManager {
    pub fn new(root: NormalizedPath, backups_dir: NormalizedPath) -> Self {
        Self { root, backups_dir }
    }

    fn backup_dir(&self, id: &str) -> Result<NormalizedPath> {
        if id.contains('/') || id.contains('\\') || id == "." || id == ".." || id.is_empty() {
            return Err(Error::BackupError {
                message: format!("Invalid backup id: {}", id),
            });
        }
        Ok(self.backups_dir.join(id))
    }

    /// Get one backup by id
    pub fn get_backup(&self, id: &str) -> Result<Option<BackupInfo>> {
        let dir = self.backup_dir(id)?;
        let metadata_path = dir.join(METADATA_FILE);

        if !metadata_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(metadata_path.as_ref())?;
        let metadata: BackupMetadata = toml::from_str(&content)?;

        Ok(Some(BackupInfo {
            id: id.to_string(),
            path: dir,
            metadata,
        }))
    }

    /// List all backups, oldest first
    pub fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();

        for entry in fs::read_dir(self.backups_dir.as_ref())? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir()
                && let Some(id) = path.file_name().and_then(|n| n.to_str())
            {
                match self.get_backup(id) {
                    Ok(Some(backup)) => backups.push(backup),
                    Ok(None) => {}
                    Err(e) => tracing::warn!(backup = id, error = %e, "Skipping unreadable backup"),
                }
            }
        }

        backups.sort_by(|a, b| a.metadata.created.cmp(&b.metadata.created));
        Ok(backups)
    }

    /// Copy a backup's files back into the local tree
    ///
    /// Returns the restored relative paths.
    pub fn restore_backup(&self, id: &str) -> Result<Vec<String>> {
        let backup = self.get_backup(id)?.ok_or_else(|| Error::BackupError {
            message: format!("No backup found: {}", id),
        })?;

        let mut restored = Vec::new();

        for file in &backup.metadata.files {
            // Metadata is just a file on disk; never let it point outside the tree
            validate_relative_path(file).map_err(|message| Error::BackupError {
                message: format!("Refusing to restore {}: {}", file, message),
            })?;

            let source = backup.path.join(FILES_DIR).join(file);
            let dest = self.root.join(file);

            if source.exists() {
                io::copy_atomic(source.as_ref(), dest.as_ref())?;
                restored.push(file.clone());
            } else {
                tracing::warn!(path = %file, backup = id, "Backed-up file is missing");
            }
        }

        tracing::info!(backup = id, files = restored.len(), "Restored backup");
        Ok(restored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::BackupSession;
    use tempfile::TempDir;

    fn setup() -> (TempDir, NormalizedPath, BackupManager) {
        let temp = TempDir::new().unwrap();
        let root = NormalizedPath::new(temp.path());
        let backups = root.join(".upsync/backups");
        let manager = BackupManager::new(root.clone(), backups);
        (temp, root, manager)
    }

    #[test]
    fn list_is_empty_initially() {
        let (_temp, _root, manager) = setup();
        assert!(manager.list_backups().unwrap().is_empty());
    }

    #[test]
    fn restore_round_trip() {
        let (temp, root, manager) = setup();
        fs::create_dir_all(temp.path().join("tools")).unwrap();
        fs::write(temp.path().join("tools/a.cfg"), "mine").unwrap();

        let mut session = BackupSession::begin(&root.join(".upsync/backups"), Some("2.0.0"));
        session.backup(temp.path(), "tools/a.cfg");
        let done = session.finish();
        let id = done.dir.unwrap().file_name().unwrap().to_string();

        fs::write(temp.path().join("tools/a.cfg"), "upstream").unwrap();

        let listed = manager.list_backups().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);

        let restored = manager.restore_backup(&id).unwrap();
        assert_eq!(restored, vec!["tools/a.cfg"]);
        assert_eq!(fs::read_to_string(temp.path().join("tools/a.cfg")).unwrap(), "mine");
    }

    #[test]
    fn restore_unknown_backup_fails() {
        let (_temp, _root, manager) = setup();
        assert!(manager.restore_backup("20200101T000000.000Z").is_err());
    }

    #[test]
    fn restore_rejects_escaping_paths() {
        let (temp, _root, manager) = setup();
        let dir = temp.path().join(".upsync/backups/evil");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(METADATA_FILE),
            "created = \"2024-01-01T00:00:00Z\"\nfiles = [\"../outside.txt\"]\n",
        )
        .unwrap();

        let result = manager.restore_backup("evil");
        assert!(matches!(result, Err(Error::BackupError { .. })));
    }

    #[test]
    fn invalid_backup_id_is_rejected() {
        let (_temp, _root, manager) = setup();
        assert!(manager.get_backup("../x").is_err());
    }

    #[test]
    fn restores_root_level_metadata_named_file() {
        let (temp, root, manager) = setup();
        fs::write(temp.path().join(METADATA_FILE), "mine = 1\n").unwrap();

        let mut session = BackupSession::begin(&root.join(".upsync/backups"), Some("1"));
        session.backup(temp.path(), METADATA_FILE);
        let id = session.finish().dir.unwrap().file_name().unwrap().to_string();

        fs::write(temp.path().join(METADATA_FILE), "upstream = 2\n").unwrap();
        manager.restore_backup(&id).unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join(METADATA_FILE)).unwrap(),
            "mine = 1\n"
        );
    }
}
