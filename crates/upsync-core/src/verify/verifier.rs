//! Verifier implementation

use super::references::{ManifestCheck, check_manifest};
use super::report::{CheckKind, CheckOutcome, VerifyResult};
use super::structured::{StructuredFormat, check_structured};
use super::syntax::{SourceLanguage, check_syntax};
use crate::config::{ReferenceManifest, VerifySection};
use crate::roots::TreeRoots;
use std::fs;
use std::time::Duration;
use upsync_fs::compute_file_checksum;

/// Checks the local tree after a sync
pub struct Verifier {
    roots: TreeRoots,
    syntax_timeout: Duration,
    references: Vec<ReferenceManifest>,
}

impl Verifier {
    pub fn new(roots: TreeRoots, config: &VerifySection) -> Self {
        Self {
            roots,
            syntax_timeout: Duration::from_millis(config.syntax_timeout_ms),
            references: config.references.clone(),
        }
    }

    /// Run every applicable check for `synced` paths, then the reference
    /// checks once for the whole tree.
    ///
    /// A file that does not exist gets no further per-file checks.
    pub fn verify<S: AsRef<str>>(&self, synced: &[S]) -> VerifyResult {
        let mut result = VerifyResult::default();

        for path in synced {
            self.verify_file(path.as_ref(), &mut result);
        }
        for manifest in &self.references {
            if let Some(outcome) = self.verify_references(manifest) {
                result.push(outcome);
            }
        }

        if result.passed {
            tracing::info!(checks = result.checks.len(), "Verification passed");
        } else {
            for failure in result.failures() {
                tracing::warn!(
                    path = failure.path.as_deref().unwrap_or("-"),
                    check = %failure.check,
                    detail = failure.detail.as_deref().unwrap_or(""),
                    "Check failed"
                );
            }
        }
        result
    }

    fn verify_file(&self, path: &str, result: &mut VerifyResult) {
        let local = self.roots.local_file(path);
        if !local.is_file() {
            result.push(CheckOutcome::fail(path, CheckKind::Exists, "missing after sync"));
            return;
        }
        result.push(CheckOutcome::pass(path, CheckKind::Exists));

        let upstream = self.roots.upstream_file(path);
        let hash_check = match (compute_file_checksum(&local), compute_file_checksum(&upstream)) {
            (Ok(l), Ok(u)) if l == u => CheckOutcome::pass(path, CheckKind::HashMatch),
            (Ok(l), Ok(u)) => CheckOutcome::fail(
                path,
                CheckKind::HashMatch,
                format!("local {} differs from upstream {}", l, u),
            ),
            (Err(e), _) => CheckOutcome::fail(path, CheckKind::HashMatch, format!("local: {}", e)),
            (_, Err(e)) => {
                CheckOutcome::fail(path, CheckKind::HashMatch, format!("upstream: {}", e))
            }
        };
        result.push(hash_check);

        let language = SourceLanguage::from_path(path);
        let format = StructuredFormat::from_path(path);
        if language.is_none() && format.is_none() {
            return;
        }

        let content = match fs::read_to_string(&local) {
            Ok(content) => content,
            Err(e) => {
                let check = if language.is_some() {
                    CheckKind::Syntax
                } else {
                    CheckKind::StructuredValid
                };
                result.push(CheckOutcome::fail(path, check, e.to_string()));
                return;
            }
        };

        if let Some(language) = language {
            tracing::debug!(path, %language, "Checking syntax");
            let outcome = check_syntax(language, &content, self.syntax_timeout);
            result.push(CheckOutcome::from_parse(path, CheckKind::Syntax, outcome));
        }
        if let Some(format) = format {
            let outcome = check_structured(format, &content);
            result.push(CheckOutcome::from_parse(path, CheckKind::StructuredValid, outcome));
        }
    }

    fn verify_references(&self, manifest: &ReferenceManifest) -> Option<CheckOutcome> {
        let path = manifest.manifest.as_str();
        match check_manifest(self.roots.local(), manifest) {
            ManifestCheck::Absent => {
                tracing::debug!(manifest = path, "No reference manifest");
                None
            }
            ManifestCheck::Unreadable(reason) => Some(CheckOutcome::fail(
                path,
                CheckKind::ReferenceIntegrity,
                reason,
            )),
            ManifestCheck::Checked { missing, .. } if missing.is_empty() => {
                Some(CheckOutcome::pass(path, CheckKind::ReferenceIntegrity))
            }
            ManifestCheck::Checked { missing, .. } => Some(CheckOutcome::fail(
                path,
                CheckKind::ReferenceIntegrity,
                format!("missing: {}", missing.join(", ")),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn setup(files: &[(&str, &str)]) -> (TempDir, TempDir, Verifier) {
        let upstream = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        for (rel, content) in files {
            write(upstream.path(), rel, content);
            write(local.path(), rel, content);
        }
        let roots = TreeRoots::new(upstream.path(), local.path()).unwrap();
        let verifier = Verifier::new(roots, &VerifySection::default());
        (upstream, local, verifier)
    }

    #[test]
    fn clean_sync_passes_every_check() {
        let (_u, _l, verifier) = setup(&[
            ("hooks/check.py", "print('ok')\n"),
            ("settings.json", r#"{"hook": {"command": "python3 hooks/check.py"}}"#),
            ("README.md", "# readme\n"),
        ]);

        let result = verifier.verify(&["hooks/check.py", "settings.json", "README.md"]);
        assert!(result.passed, "{:?}", result);
        assert_eq!(result.count(CheckKind::Exists), 3);
        assert_eq!(result.count(CheckKind::Syntax), 1);
        assert_eq!(result.count(CheckKind::StructuredValid), 1);
        assert_eq!(result.count(CheckKind::ReferenceIntegrity), 1);
    }

    #[test]
    fn missing_file_fails_exists_only() {
        let (_u, local, verifier) = setup(&[("tools/a.cfg", "x")]);
        fs::remove_file(local.path().join("tools/a.cfg")).unwrap();

        let result = verifier.verify(&["tools/a.cfg"]);
        assert!(!result.passed);
        assert_eq!(result.checks.len(), 1);
        assert_eq!(result.checks[0].check, CheckKind::Exists);
    }

    #[test]
    fn divergent_content_fails_hash_match() {
        let (_u, local, verifier) = setup(&[("tools/a.cfg", "x")]);
        fs::write(local.path().join("tools/a.cfg"), "y").unwrap();

        let result = verifier.verify(&["tools/a.cfg"]);
        assert!(!result.passed);
        let failure = result.failures().next().unwrap();
        assert_eq!(failure.check, CheckKind::HashMatch);
    }

    #[test]
    fn broken_json_fails_structured_check() {
        let (_u, _l, verifier) = setup(&[("data/conf.json", "{\"a\": ")]);
        let result = verifier.verify(&["data/conf.json"]);
        assert!(!result.passed);
        assert!(
            result
                .failures()
                .any(|c| c.check == CheckKind::StructuredValid)
        );
    }

    #[test]
    fn dangling_reference_fails_even_when_manifest_not_synced() {
        let (_u, _l, verifier) = setup(&[(
            "settings.json",
            r#"{"hook": {"command": "bash $ROOT/hooks/removed.sh"}}"#,
        )]);

        let result = verifier.verify::<&str>(&[]);
        assert!(!result.passed);
        let failure = result.failures().next().unwrap();
        assert_eq!(failure.check, CheckKind::ReferenceIntegrity);
        assert!(failure.detail.as_deref().unwrap().contains("hooks/removed.sh"));
    }

    #[test]
    fn absent_manifest_adds_no_check() {
        let (_u, _l, verifier) = setup(&[("a.txt", "a")]);
        let result = verifier.verify(&["a.txt"]);
        assert!(result.passed);
        assert_eq!(result.count(CheckKind::ReferenceIntegrity), 0);
    }
}
