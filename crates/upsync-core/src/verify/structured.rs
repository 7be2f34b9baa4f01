//! Structured data validity checks

use super::report::ParseOutcome;

/// Structured formats the verifier parses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredFormat {
    Json,
    Yaml,
    Toml,
}

impl StructuredFormat {
    /// Format for a relative path, judged by extension
    pub fn from_path(path: &str) -> Option<Self> {
        let name = path.rsplit('/').next()?;
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Parse `content` in `format`, reporting the parser's message on failure.
pub fn check_structured(format: StructuredFormat, content: &str) -> ParseOutcome {
    let result = match format {
        StructuredFormat::Json => serde_json::from_str::<serde_json::Value>(content)
            .map(drop)
            .map_err(|e| e.to_string()),
        StructuredFormat::Yaml => serde_yaml::from_str::<serde_yaml::Value>(content)
            .map(drop)
            .map_err(|e| e.to_string()),
        StructuredFormat::Toml => toml::from_str::<toml::Table>(content)
            .map(drop)
            .map_err(|e| e.to_string()),
    };

    match result {
        Ok(()) => ParseOutcome::Ok,
        Err(reason) => ParseOutcome::Error(reason),
    }
}
