//! Sync options

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How to resolve a path changed on both sides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictStrategy {
    /// Keep the local file; reported as skipped
    KeepLocal,
    /// Overwrite with upstream after backing the local file up
    TakeUpstream,
    /// Leave the file alone and report it as an unresolved conflict
    #[default]
    Skip,
}

impl ConflictStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KeepLocal => "keep-local",
            Self::TakeUpstream => "take-upstream",
            Self::Skip => "skip",
        }
    }

    /// List all valid strategy names
    pub fn all_names() -> &'static [&'static str] {
        &["keep-local", "take-upstream", "skip"]
    }
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep-local" => Ok(Self::KeepLocal),
            "take-upstream" => Ok(Self::TakeUpstream),
            "skip" => Ok(Self::Skip),
            other => Err(Error::InvalidConfig {
                message: format!(
                    "unknown conflict strategy '{}' (expected one of: {})",
                    other,
                    Self::all_names().join(", ")
                ),
            }),
        }
    }
}

/// Options for a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// If true, plan the run and report it without touching disk
    pub dry_run: bool,
    pub conflict_strategy: ConflictStrategy,
    /// Log every routed entry at info level instead of debug
    pub verbose: bool,
}
