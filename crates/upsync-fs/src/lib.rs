//! Filesystem primitives for upsync
//!
//! Provides forward-slash path handling, the canonical `sha256:` checksum
//! format, tree discovery and atomic I/O used by the sync engine.

pub mod checksum;
pub mod config;
pub mod discovery;
pub mod error;
pub mod io;
pub mod path;

pub use checksum::{compute_content_checksum, compute_file_checksum};
pub use config::ConfigStore;
pub use discovery::{DiscoveryFilter, PatternSet, TreeListing, discover_files, discover_union};
pub use error::{Error, Result};
pub use path::{NormalizedPath, relative_key, validate_relative_path};
