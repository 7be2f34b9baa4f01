//! Core engine for selective upstream synchronization
//!
//! This crate keeps a customized local tree in step with newer releases of
//! the upstream tree it was derived from, implementing:
//!
//! - **Diff Engine**: Three-way classification of every path against a baseline
//! - **Sync Executor**: Conflict strategies, protection rules and backups before writes
//! - **Verifier**: Existence, hash, syntax, structured-data and reference checks
//! - **State Store**: The persisted baseline and version history
//! - **Upstream sources** and post-sync **triggers**
//!
//! # Architecture
//!
//! `upsync-core` sits above the Layer 0 crate and below the CLI:
//!
//! ```text
//!                 upsync-cli
//!                      |
//!                 upsync-core
//!                      |
//!                  upsync-fs
//! ```
//!
//! # Example
//!
//! ```no_run
//! use upsync_core::{Result, SyncEngine, SyncOptions};
//!
//! fn example() -> Result<()> {
//!     let engine = SyncEngine::open(".")?;
//!     let store = engine.state_store();
//!     let mut state = store.load().state;
//!
//!     let upstream = engine.resolve_version("1.4.0")?;
//!     let outcome = engine.sync(&upstream, "1.4.0", &mut state, &SyncOptions::default())?;
//!     if outcome.state_updated {
//!         store.save(&state)?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod backup;
pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod roots;
pub mod source;
pub mod state;
pub mod sync;
pub mod triggers;
pub mod verify;

pub use backup::{BackupInfo, BackupManager, BackupMetadata, BackupSession};
pub use config::{EngineConfig, EngineLayout, TriggerConfig};
pub use diff::{DiffEngine, DiffReport, DiffStatus, FileDiffEntry};
pub use engine::{SyncEngine, SyncOutcome};
pub use error::{Error, Result};
pub use roots::TreeRoots;
pub use source::{DirectorySource, UpstreamSource};
pub use state::{Resolution, StateStore, SyncState};
pub use sync::{ConflictStrategy, SyncExecutor, SyncOptions, SyncResult};
pub use triggers::{matching_triggers, run_triggers};
pub use verify::{CheckKind, ParseOutcome, Verifier, VerifyResult};
