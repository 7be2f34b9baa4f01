//! Resolution of `--version` / `--upstream` into an upstream tree

use std::path::PathBuf;

use colored::Colorize;
use upsync_core::SyncEngine;
use upsync_core::state::LoadedState;

use crate::cli::UpstreamArgs;
use crate::error::{CliError, Result};

/// An upstream tree and the version label it is recorded under
pub struct ResolvedUpstream {
    pub dir: PathBuf,
    pub version: String,
}

/// Resolve the upstream tree named by `args`.
///
/// A directory given with `--upstream` is recorded under its own name.
pub fn resolve(engine: &SyncEngine, args: &UpstreamArgs) -> Result<ResolvedUpstream> {
    match (&args.version, &args.upstream) {
        (Some(version), _) => Ok(ResolvedUpstream {
            dir: engine.resolve_version(version)?,
            version: version.clone(),
        }),
        (None, Some(dir)) => {
            let version = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .filter(|n| !n.is_empty() && n != "..")
                .unwrap_or_else(|| "unversioned".to_string());
            Ok(ResolvedUpstream {
                dir: dir.clone(),
                version,
            })
        }
        (None, None) => Err(CliError::user("Pass --version or --upstream")),
    }
}

/// Print the warning attached to a degraded state load, if any.
pub fn report_state_warning(loaded: &LoadedState) {
    if let Some(warning) = &loaded.warning {
        eprintln!("{} {}", "WARNING".yellow().bold(), warning);
    }
}
