// SPDX-License-Identifier: MIT

//! Engine configuration
//!
//! Options are plain serde structs so they can live next to workflow
//! definitions in YAML, e.g.
//!
//! ```yaml
//! parser:
//!   max_depth: 32
//! default_result: true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

pub const DEFAULT_MAX_DEPTH: usize = 64;

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Options honored by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserOptions {
    /// Maximum number of nested predicate levels, counting groups and operator switches
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Options for an [`Engine`](crate::criteria::Engine)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineOptions {
    #[serde(default)]
    pub parser: ParserOptions,

    /// Result of an empty expression
    #[serde(default)]
    pub default_result: bool,
}

impl EngineOptions {
    /// Load options from a YAML or JSON file, chosen by extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let options: EngineOptions = serde_yaml::from_str(content)?;
        options.validate()
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let options: EngineOptions = serde_json::from_str(content)?;
        options.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.parser.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "parser.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }
}
