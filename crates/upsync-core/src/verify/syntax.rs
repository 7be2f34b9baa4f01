//! Source syntax checks backed by tree-sitter
//!
//! Files are parsed, never executed. Tree-sitter recovers from errors, so a
//! parse "succeeds" even for broken input; the check fails when the tree
//! contains ERROR or MISSING nodes.

use super::report::ParseOutcome;
use std::fmt;
use std::time::Duration;

/// Languages the syntax check understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLanguage {
    Rust,
    Python,
    /// Plain TypeScript, where `<T>expr` is a type assertion
    TypeScript,
    /// TSX, also used for JavaScript since it accepts JSX
    Tsx,
}

impl SourceLanguage {
    /// Language for a file extension (without the dot)
    ///
    /// ```
    /// use upsync_core::verify::SourceLanguage;
    ///
    /// assert_eq!(SourceLanguage::from_extension("ts"), Some(SourceLanguage::TypeScript));
    /// assert_eq!(SourceLanguage::from_extension("mjs"), Some(SourceLanguage::Tsx));
    /// assert_eq!(SourceLanguage::from_extension("json"), None);
    /// ```
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "rs" => Some(Self::Rust),
            "py" => Some(Self::Python),
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" | "js" | "jsx" | "mjs" | "cjs" => Some(Self::Tsx),
            _ => None,
        }
    }

    /// Language for a relative path
    pub fn from_path(path: &str) -> Option<Self> {
        let name = path.rsplit('/').next()?;
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    fn tree_sitter_language(self) -> tree_sitter::Language {
        match self {
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rust => "rust",
            Self::Python => "python",
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
        }
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse `source` as `language`, giving up after `timeout`.
pub fn check_syntax(language: SourceLanguage, source: &str, timeout: Duration) -> ParseOutcome {
    let mut parser = tree_sitter::Parser::new();
    if let Err(e) = parser.set_language(&language.tree_sitter_language()) {
        return ParseOutcome::Error(format!("cannot load {} grammar: {}", language, e));
    }

    let micros = u64::try_from(timeout.as_micros()).unwrap_or(u64::MAX);
    #[allow(deprecated)]
    parser.set_timeout_micros(micros);

    let Some(tree) = parser.parse(source, None) else {
        return ParseOutcome::Error(format!(
            "parse did not finish within {} ms",
            timeout.as_millis()
        ));
    };

    match first_error(tree.root_node()) {
        Some(node) => {
            let start = node.start_position();
            let what = if node.is_missing() {
                format!("missing {}", node.kind())
            } else {
                "syntax error".to_string()
            };
            ParseOutcome::Error(format!(
                "{} at line {}, column {}",
                what,
                start.row + 1,
                start.column + 1
            ))
        }
        None => ParseOutcome::Ok,
    }
}

fn first_error(node: tree_sitter::Node<'_>) -> Option<tree_sitter::Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}
