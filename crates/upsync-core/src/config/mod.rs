//! Engine configuration and on-disk layout
//!
//! Configuration lives in `.upsync/config.toml` inside the local tree. A
//! missing file means defaults; anything present must parse.

mod layout;

pub use layout::{CONFIG_DIR, EngineLayout};

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use upsync_fs::{ConfigStore, DiscoveryFilter, PatternSet};

fn default_syntax_timeout_ms() -> u64 {
    2000
}

fn default_reference_keys() -> Vec<String> {
    vec!["command".to_string()]
}

fn default_references() -> Vec<ReferenceManifest> {
    vec![ReferenceManifest {
        manifest: "settings.json".to_string(),
        keys: default_reference_keys(),
    }]
}

/// Where upstream releases come from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamSection {
    /// Directory holding one subdirectory per upstream version.
    /// Relative paths resolve against the local root.
    #[serde(default)]
    pub releases_dir: Option<String>,
}

/// A configuration file whose values reference other files in the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceManifest {
    /// Relative path of the manifest inside the local tree
    pub manifest: String,
    /// Object keys whose string values may contain file references
    #[serde(default = "default_reference_keys")]
    pub keys: Vec<String>,
}

/// Verifier settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifySection {
    /// Upper bound for parsing one source file
    #[serde(default = "default_syntax_timeout_ms")]
    pub syntax_timeout_ms: u64,

    #[serde(default = "default_references")]
    pub references: Vec<ReferenceManifest>,
}

impl Default for VerifySection {
    fn default() -> Self {
        Self {
            syntax_timeout_ms: default_syntax_timeout_ms(),
            references: default_references(),
        }
    }
}

/// An external action fired when synced paths fall under one of `prefixes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    pub name: String,
    pub prefixes: Vec<String>,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Parsed `.upsync/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub upstream: UpstreamSection,

    /// Glob patterns of paths that are never changed automatically
    #[serde(default)]
    pub protected: Vec<String>,

    /// Glob patterns of paths left out of discovery in both trees
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub verify: VerifySection,

    #[serde(default)]
    pub triggers: Vec<TriggerConfig>,
}

impl EngineConfig {
    /// Parse a configuration from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use upsync_core::config::EngineConfig;
    ///
    /// let config = EngineConfig::parse(r#"
    /// protected = ["settings.local.json", "memory/**"]
    ///
    /// [upstream]
    /// releases_dir = "../releases"
    /// "#).unwrap();
    ///
    /// assert_eq!(config.protected.len(), 2);
    /// assert_eq!(config.verify.syntax_timeout_ms, 2000);
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration for a layout, falling back to defaults when
    /// no config file exists.
    pub fn load(layout: &EngineLayout) -> Result<Self> {
        let path = layout.config_path();
        if !path.exists() {
            tracing::debug!(path = %path, "No config file, using defaults");
            return Ok(Self::default());
        }
        let config: EngineConfig = ConfigStore::new().load(&path)?;
        config.validate()?;
        Ok(config)
    }

    /// Persist this configuration to the layout's config path.
    pub fn save(&self, layout: &EngineLayout) -> Result<()> {
        ConfigStore::new().save(&layout.config_path(), self)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        self.protection_patterns()?;
        self.discovery_filter()?;
        for trigger in &self.triggers {
            if trigger.prefixes.is_empty() {
                return Err(Error::InvalidConfig {
                    message: format!("trigger '{}' has no prefixes", trigger.name),
                });
            }
        }
        Ok(())
    }

    /// Compiled protection patterns.
    pub fn protection_patterns(&self) -> Result<PatternSet> {
        Ok(PatternSet::new(&self.protected)?)
    }

    /// Discovery filter built from the exclude patterns.
    pub fn discovery_filter(&self) -> Result<DiscoveryFilter> {
        Ok(DiscoveryFilter::new(PatternSet::new(&self.exclude)?))
    }
}
