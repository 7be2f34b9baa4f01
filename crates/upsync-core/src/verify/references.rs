//! Reference integrity of configuration manifests
//!
//! A manifest such as `settings.json` wires commands to scripts shipped in
//! the tree. After a sync every script a command names must still exist.

use crate::config::ReferenceManifest;
use regex::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::LazyLock;
use upsync_fs::NormalizedPath;

/// `$VAR/` or `${VAR}/` at the start of a token
static VAR_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$(\{[A-Za-z_][A-Za-z0-9_]*\}|[A-Za-z_][A-Za-z0-9_]*)/")
        .expect("Invalid variable prefix regex")
});

/// Tokens of `command` that look like relative file paths.
///
/// A token counts when, after stripping quotes and a leading variable
/// prefix, it contains `/` and is a URL-free path inside the tree. Tokens
/// that climb out with `..` are never treated as references.
///
/// ```
/// use upsync_core::verify::path_references;
///
/// let refs = path_references(r#"python3 "$PROJECT_DIR/hooks/check.py" --fast"#);
/// assert_eq!(refs, vec!["hooks/check.py"]);
/// ```
pub fn path_references(command: &str) -> Vec<String> {
    command
        .split_whitespace()
        .filter_map(|raw| {
            let token = raw.trim_matches(|c| matches!(c, '"' | '\'' | '`'));
            let token = VAR_PREFIX.replace(token, "");
            let token = token.trim_start_matches("./");
            let looks_like_path = token.contains('/')
                && !token.starts_with('/')
                && !token.starts_with('~')
                && !token.contains("://")
                && !token.contains('$')
                && !token.contains(['\\', '*', '?'])
                && upsync_fs::validate_relative_path(token).is_ok();
            looks_like_path.then(|| token.to_string())
        })
        .collect()
}

/// String values stored under any of `keys`, at any depth of `value`
pub fn collect_key_values<'a>(value: &'a Value, keys: &[String], out: &mut Vec<&'a str>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if keys.iter().any(|k| k == key) {
                    push_strings(child, out);
                }
                collect_key_values(child, keys, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_key_values(item, keys, out);
            }
        }
        _ => {}
    }
}

fn push_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => {
            for item in items {
                if let Value::String(s) = item {
                    out.push(s);
                }
            }
        }
        _ => {}
    }
}

/// Result of checking one manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestCheck {
    /// Manifest not present in the local tree
    Absent,
    /// Manifest could not be read or parsed
    Unreadable(String),
    /// References found, with those that do not resolve
    Checked {
        references: Vec<String>,
        missing: Vec<String>,
    },
}

/// Resolve every path reference of `manifest` against `local_root`.
pub fn check_manifest(local_root: &Path, manifest: &ReferenceManifest) -> ManifestCheck {
    let root = NormalizedPath::new(local_root);
    let manifest_path = root.join(&manifest.manifest);
    if !manifest_path.is_file() {
        return ManifestCheck::Absent;
    }

    let content = match upsync_fs::io::read_text(&manifest_path) {
        Ok(content) => content,
        Err(e) => return ManifestCheck::Unreadable(e.to_string()),
    };
    let value: Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => return ManifestCheck::Unreadable(e.to_string()),
    };

    let mut commands = Vec::new();
    collect_key_values(&value, &manifest.keys, &mut commands);

    let mut references: Vec<String> = commands.into_iter().flat_map(path_references).collect();
    references.sort();
    references.dedup();

    let missing = references
        .iter()
        .filter(|r| !root.join(r).is_file())
        .cloned()
        .collect();

    ManifestCheck::Checked {
        references,
        missing,
    }
}
