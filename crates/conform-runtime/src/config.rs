//! Validator configuration.
//!
//! The engine itself has a single tunable, the nesting limit. The struct is
//! serde-friendly so hosts can embed it in their own config files.
//!
//! ```toml
//! max_depth = 32
//! ```

use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Nesting limit used when nothing else is configured.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Configuration for a validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Deepest schema node a pass may reach before failing with
    /// `ErrorKind::DepthExceeded`. Never zero.
    #[serde(deserialize_with = "nonzero_depth")]
    pub max_depth: usize,
}

fn nonzero_depth<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let depth = usize::deserialize(deserializer)?;
    if depth == 0 {
        return Err(de::Error::custom(ConfigError::ZeroDepth));
    }
    Ok(depth)
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Errors from loading a [`ValidatorConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid validator config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("max_depth must be at least 1")]
    ZeroDepth,
}

impl ValidatorConfig {
    /// Set the nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse a TOML document. Missing fields keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.check()?;
        Ok(config)
    }

    /// Reject settings that would make every validation fail.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        Ok(())
    }
}
