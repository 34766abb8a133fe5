//! Compiler configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Could not read config '{path}': {source}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The file is not a valid configuration
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Limits and options shared by both compilers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CompilerConfig {
    /// Deepest allowed nesting of combinators, navigation and functions
    pub max_depth: usize,
    /// Most values accepted in a list parameter
    pub max_list_size: usize,
    /// Drop repeated values from list parameters
    pub deduplicate_lists: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_list_size: 10_000,
            deduplicate_lists: true,
        }
    }
}

impl CompilerConfig {
    /// Parse from JSON text; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}
