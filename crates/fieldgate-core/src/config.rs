use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;

///
/// EngineConfig
///
/// Tunables for the expression codecs and the access-control builder.
/// Every key is optional; an empty document yields the defaults.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub dsl: DslConfig,

    #[serde(default)]
    pub access: AccessConfig,
}

impl EngineConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parse and validate a TOML document.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sep = self.dsl.apply_all_separator.as_str();
        if sep.is_empty() || RESERVED_TOKENS.contains(&sep) {
            return Err(ConfigError::InvalidSeparator {
                separator: sep.to_string(),
            });
        }

        if self.dsl.max_depth == 0 {
            return Err(ConfigError::InvalidValue {
                key: "dsl.max_depth",
                message: "must be at least 1".to_string(),
            });
        }

        if self.dsl.max_source_len == 0 {
            return Err(ConfigError::InvalidValue {
                key: "dsl.max_source_len",
                message: "must be at least 1".to_string(),
            });
        }

        if self.access.permissions_path.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "access.permissions_path",
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

// Tokens the string grammar already gives a meaning to.
const RESERVED_TOKENS: [&str; 3] = ["&&", "||", "::"];

///
/// DslConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DslConfig {
    #[serde(default = "default_separator")]
    pub apply_all_separator: String,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default = "default_max_source_len")]
    pub max_source_len: usize,
}

impl Default for DslConfig {
    fn default() -> Self {
        Self {
            apply_all_separator: default_separator(),
            max_depth: default_max_depth(),
            max_source_len: default_max_source_len(),
        }
    }
}

fn default_separator() -> String {
    "|||".to_string()
}

const fn default_max_depth() -> usize {
    32
}

const fn default_max_source_len() -> usize {
    16 * 1024
}

///
/// AccessConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AccessConfig {
    /// Document path of the embedded permission aggregate.
    #[serde(default = "default_permissions_path")]
    pub permissions_path: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            permissions_path: default_permissions_path(),
        }
    }
}

/// Where resources embed their permission aggregate unless configured.
pub const DEFAULT_PERMISSIONS_PATH: &str = "permissions";

fn default_permissions_path() -> String {
    DEFAULT_PERMISSIONS_PATH.to_string()
}

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {message}")]
    Parse { message: String },

    #[error("apply-all separator '{separator}' is empty or collides with a grammar token")]
    InvalidSeparator { separator: String },

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

///
/// TESTS
///
