//! Scoped backup of one sync run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use upsync_fs::{NormalizedPath, io};

pub(crate) const METADATA_FILE: &str = "metadata.toml";
/// Subdirectory holding the file copies, kept apart from [`METADATA_FILE`]
pub(crate) const FILES_DIR: &str = "files";

/// Metadata stored next to the backed-up files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupMetadata {
    /// When the backup was created
    pub created: DateTime<Utc>,
    /// Upstream version being applied when the backup was taken
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Backed-up files (relative paths)
    pub files: Vec<String>,
}

/// A file that could not be backed up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupFailure {
    pub path: String,
    pub message: String,
}

/// Result of a finished session
#[derive(Debug, Clone)]
pub struct CompletedBackup {
    /// Directory holding the backup; `None` when nothing was backed up
    pub dir: Option<NormalizedPath>,
    pub files: Vec<String>,
    pub failures: Vec<BackupFailure>,
}

/// Collects the local files a run is about to overwrite
///
/// The session is opened before any copy starts and [`finish`] is called once
/// every at-risk file went through [`backup`], so the backup directory is
/// complete before the tree is touched. The directory is only created on the
/// first successful backup.
///
/// [`finish`]: BackupSession::finish
/// [`backup`]: BackupSession::backup
pub struct BackupSession {
    dir: NormalizedPath,
    created: DateTime<Utc>,
    version: Option<String>,
    files: Vec<String>,
    failures: Vec<BackupFailure>,
}

impl BackupSession {
    /// Open a session under `backups_root`, named after the current time.
    pub fn begin(backups_root: &NormalizedPath, version: Option<&str>) -> Self {
        let created = Utc::now();
        let stamp = created.format("%Y%m%dT%H%M%S%.3fZ").to_string();
        let mut dir = backups_root.join(&stamp);
        let mut suffix = 1;
        while dir.exists() {
            dir = backups_root.join(&format!("{}-{}", stamp, suffix));
            suffix += 1;
        }

        Self {
            dir,
            created,
            version: version.map(str::to_string),
            files: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn dir(&self) -> &NormalizedPath {
        &self.dir
    }

    /// Copy `relative` from `local_root` into the backup.
    ///
    /// Failures are logged and recorded; they never abort the session.
    /// Returns whether the file was backed up.
    pub fn backup(&mut self, local_root: &Path, relative: &str) -> bool {
        let source = NormalizedPath::new(local_root).join(relative).to_native();
        let dest = self.dir.join(FILES_DIR).join(relative).to_native();

        match io::copy_atomic(&source, &dest) {
            Ok(()) => {
                tracing::debug!(path = relative, backup = %self.dir, "Backed up");
                self.files.push(relative.to_string());
                true
            }
            Err(e) => {
                tracing::warn!(path = relative, error = %e, "Backup failed, continuing");
                self.failures.push(BackupFailure {
                    path: relative.to_string(),
                    message: e.to_string(),
                });
                false
            }
        }
    }

    /// Write the metadata file and close the session.
    ///
    /// A metadata write failure is recorded like any other backup failure;
    /// the backed-up files stay in place.
    pub fn finish(mut self) -> CompletedBackup {
        if self.files.is_empty() {
            if self.dir.exists() {
                // Only partial temp files from failed copies can be in here
                let _ = fs::remove_dir_all(self.dir.to_native());
            }
            return CompletedBackup {
                dir: None,
                files: Vec::new(),
                failures: self.failures,
            };
        }

        let metadata = BackupMetadata {
            created: self.created,
            version: self.version.clone(),
            files: self.files.clone(),
        };
        let written = toml::to_string_pretty(&metadata)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                io::write_text(&self.dir.join(METADATA_FILE), &content).map_err(|e| e.to_string())
            });
        if let Err(message) = written {
            tracing::warn!(backup = %self.dir, error = %message, "Cannot write backup metadata");
            self.failures.push(BackupFailure {
                path: METADATA_FILE.to_string(),
                message,
            });
        }

        tracing::info!(backup = %self.dir, files = self.files.len(), "Backup complete");
        CompletedBackup {
            dir: Some(self.dir),
            files: self.files,
            failures: self.failures,
        }
    }
}
