//! Three-way classification of upstream and local trees
//!
//! This module provides:
//! - **entry**: the per-path [`FileDiffEntry`] and the aggregated [`DiffReport`]
//! - **engine**: [`DiffEngine`], which hashes both trees and classifies each path
//!   against the persisted baseline
//! - **patch**: unified text patches for previewing modified files

mod engine;
mod entry;
mod patch;

pub use engine::{Classification, DiffEngine, classify};
pub use entry::{DiffError, DiffReport, DiffStatus, DiffSummary, FileDiffEntry};
pub use patch::unified_patch;
