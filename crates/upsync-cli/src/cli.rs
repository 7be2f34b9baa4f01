//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use upsync_core::ConflictStrategy;

/// upsync - Pull upstream releases into a customized local tree
#[derive(Parser, Debug)]
#[command(name = "upsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Local tree to operate on
    #[arg(long, global = true, default_value = ".")]
    pub local: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where the upstream tree comes from
#[derive(Args, Debug, Clone, PartialEq, Eq)]
#[group(required = true, multiple = false)]
pub struct UpstreamArgs {
    /// Upstream version, resolved in the configured releases directory
    #[arg(long = "version")]
    pub version: Option<String>,

    /// Upstream tree given directly as a directory
    #[arg(long)]
    pub upstream: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List upstream versions and record newly seen ones
    Detect {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Classify every file against the last synced baseline
    Diff {
        #[command(flatten)]
        upstream: UpstreamArgs,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,

        /// Show a unified patch for each changed file
        #[arg(long)]
        patch: bool,
    },

    /// Apply upstream changes to the local tree
    ///
    /// Examples:
    ///   upsync sync --version 1.4.0 --dry-run
    ///   upsync sync --version 1.4.0 --conflict keep-local
    ///   upsync sync --upstream ../checkout --conflict take-upstream
    Sync {
        #[command(flatten)]
        upstream: UpstreamArgs,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// How to resolve files changed on both sides
        #[arg(long, default_value = "skip")]
        conflict: ConflictStrategy,

        /// Output as JSON for CI/CD integration
        #[arg(long)]
        json: bool,
    },

    /// Record the current local tree as the baseline for a version
    Bootstrap {
        #[command(flatten)]
        upstream: UpstreamArgs,

        /// Replace an existing baseline
        #[arg(long)]
        force: bool,
    },

    /// Show the recorded baseline and version history
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List backups taken before syncs
    Backups,

    /// Copy the files of a backup back into the local tree
    Restore {
        /// Backup id as shown by `upsync backups`
        id: String,
    },
}
