//! Error types for upsync-core

use std::path::PathBuf;

/// Result type for upsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in upsync-core operations
///
/// Per-file problems (unreadable files, failed copies, failed checks) are
/// collected into reports instead; these variants are the conditions that
/// stop an invocation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Upstream or local root is missing or not a directory
    #[error("Invalid {role} directory: {path}")]
    InvalidRoot { role: &'static str, path: PathBuf },

    /// Requested upstream version is not available from the source
    #[error("Upstream version not found: {version}")]
    VersionNotFound { version: String },

    /// Configuration file could not be used
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Backup could not be created, listed or restored
    #[error("Backup error: {message}")]
    BackupError { message: String },

    /// A post-sync trigger exited unsuccessfully
    #[error("Trigger '{name}' failed: {message}")]
    TriggerFailed { name: String, message: String },

    /// Filesystem error from upsync-fs
    #[error(transparent)]
    Fs(#[from] upsync_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}
