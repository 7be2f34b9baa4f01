//! Applying a classified diff to the local tree
//!
//! This module provides:
//! - **options**: [`SyncOptions`] and the [`ConflictStrategy`] policy
//! - **report**: the per-run [`SyncResult`]
//! - **executor**: [`SyncExecutor`], which plans, backs up and copies

mod executor;
mod options;
mod report;

pub use executor::{SyncExecutor, SyncPlan};
pub use options::{ConflictStrategy, SyncOptions};
pub use report::{SkipReason, SkippedEntry, SyncAction, SyncActionKind, SyncError, SyncResult};
