//! Engine configuration.
//!
//! [`EngineConfig`] collects everything an [`Engine`](crate::Engine) is built
//! from that is plain data: the syntax tokens, the cache size, the default
//! escape type and template directories. Every field has a default, so a
//! YAML file only lists what it changes:
//!
//! ```yaml
//! cache_capacity: 0        # reparse on every load, for development
//! default_escape: text
//! template_dirs: [templates, shared/templates]
//! syntax:
//!   var_start: "{{"
//!   var_end: "}}"
//!   tag_start: "{%"
//!   tag_end: "%}"
//! ```
//!
//! Tokens are validated when the engine is built, not when the file is read.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::part::EscapeType;
use crate::syntax::SyntaxConfig;

/// Default number of cached templates.
pub const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Plain-data engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Token strings.
    pub syntax: SyntaxConfig,
    /// Maximum number of cached templates; `0` disables caching.
    pub cache_capacity: usize,
    /// Escape type for values set without one.
    pub default_escape: EscapeType,
    /// Directories searched for templates when no resolver is given.
    pub template_dirs: Vec<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            syntax: SyntaxConfig::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            default_escape: EscapeType::Html,
            template_dirs: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed YAML or unknown keys.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads and parses a YAML configuration file.
    ///
    /// Relative template directories are taken relative to the file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml(&content)?;
        if let Some(base) = path.parent() {
            for dir in &mut config.template_dirs {
                if dir.is_relative() {
                    *dir = base.join(&*dir);
                }
            }
        }
        Ok(config)
    }
}
