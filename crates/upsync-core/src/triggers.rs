//! Post-sync triggers
//!
//! A trigger is an external command configured in config.toml as a
//! `[[triggers]]` entry. It fires after a verified, non-dry-run sync when any
//! synced path falls under one of its prefixes. The synced paths are passed
//! to the command through the environment.

use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use crate::config::TriggerConfig;
use crate::error::{Error, Result};
use upsync_fs::NormalizedPath;

/// Environment variable holding the synced paths that matched, one per line
pub const ENV_SYNCED_PATHS: &str = "UPSYNC_SYNCED_PATHS";
/// Environment variable holding the synced upstream version
pub const ENV_VERSION: &str = "UPSYNC_VERSION";

/// A trigger selected for a sync, with the paths that selected it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerMatch<'a> {
    pub trigger: &'a TriggerConfig,
    pub paths: Vec<String>,
}

/// Result of running a single trigger
#[derive(Debug)]
pub struct TriggerResult {
    pub name: String,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// Triggers whose prefixes match at least one synced path, in config order
pub fn matching_triggers<'a, S: AsRef<str>>(
    triggers: &'a [TriggerConfig],
    synced: &[S],
) -> Vec<TriggerMatch<'a>> {
    triggers
        .iter()
        .filter_map(|trigger| {
            let paths: Vec<String> = synced
                .iter()
                .map(|s| s.as_ref())
                .filter(|path| {
                    let path = NormalizedPath::new(path);
                    trigger.prefixes.iter().any(|p| path.starts_with(p))
                })
                .map(str::to_string)
                .collect();
            (!paths.is_empty()).then_some(TriggerMatch { trigger, paths })
        })
        .collect()
}

/// Run all matched triggers in order.
///
/// Stops at the first trigger that fails to start or exits non-zero.
pub fn run_triggers(
    matches: &[TriggerMatch<'_>],
    version: &str,
    work_dir: &Path,
) -> Result<Vec<TriggerResult>> {
    let mut results = Vec::new();
    for m in matches {
        let result = run_trigger(m, version, work_dir)?;
        if !result.success {
            let stderr = result.stderr.trim();
            let message = if stderr.is_empty() {
                format!("exited with status {:?}", result.exit_code)
            } else {
                format!("exited with status {:?}: {}", result.exit_code, stderr)
            };
            return Err(Error::TriggerFailed {
                name: result.name,
                message,
            });
        }
        results.push(result);
    }
    Ok(results)
}

fn run_trigger(m: &TriggerMatch<'_>, version: &str, work_dir: &Path) -> Result<TriggerResult> {
    let trigger = m.trigger;
    tracing::info!(trigger = %trigger.name, command = %trigger.command, "Running trigger");

    let mut env = HashMap::new();
    env.insert(ENV_SYNCED_PATHS, m.paths.join("\n"));
    env.insert(ENV_VERSION, version.to_string());

    let output = Command::new(&trigger.command)
        .args(&trigger.args)
        .current_dir(work_dir)
        .envs(&env)
        .output()
        .map_err(|e| Error::TriggerFailed {
            name: trigger.name.clone(),
            message: format!("cannot start '{}': {}", trigger.command, e),
        })?;

    Ok(TriggerResult {
        name: trigger.name.clone(),
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code(),
    })
}
