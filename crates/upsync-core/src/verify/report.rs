//! Verification result types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of post-sync checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    Exists,
    HashMatch,
    Syntax,
    StructuredValid,
    ReferenceIntegrity,
}

impl CheckKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exists => "exists",
            Self::HashMatch => "hash-match",
            Self::Syntax => "syntax",
            Self::StructuredValid => "structured-valid",
            Self::ReferenceIntegrity => "reference-integrity",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of parsing a file without executing it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "lowercase")]
pub enum ParseOutcome {
    Ok,
    Error(String),
}

impl ParseOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Ok => None,
            Self::Error(reason) => Some(reason),
        }
    }
}

/// One check against one file (or the whole tree, for reference checks)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Checked path; the manifest path for reference checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub check: CheckKind,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CheckOutcome {
    pub fn pass(path: impl Into<String>, check: CheckKind) -> Self {
        Self {
            path: Some(path.into()),
            check,
            passed: true,
            detail: None,
        }
    }

    pub fn fail(path: impl Into<String>, check: CheckKind, detail: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            check,
            passed: false,
            detail: Some(detail.into()),
        }
    }

    pub(crate) fn from_parse(path: &str, check: CheckKind, outcome: ParseOutcome) -> Self {
        match outcome {
            ParseOutcome::Ok => Self::pass(path, check),
            ParseOutcome::Error(reason) => Self::fail(path, check, reason),
        }
    }
}

/// Report of one verification run
///
/// `passed` is the conjunction of every check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResult {
    pub passed: bool,
    pub checks: Vec<CheckOutcome>,
}

impl Default for VerifyResult {
    fn default() -> Self {
        Self {
            passed: true,
            checks: Vec::new(),
        }
    }
}

impl VerifyResult {
    pub fn push(&mut self, outcome: CheckOutcome) {
        self.passed &= outcome.passed;
        self.checks.push(outcome);
    }

    /// Checks that did not pass
    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(|c| !c.passed)
    }

    pub fn count(&self, check: CheckKind) -> usize {
        self.checks.iter().filter(|c| c.check == check).count()
    }
}
