//! reflint.yaml configuration
//!
//! ```yaml
//! reflinks: [verb, generate]
//! links:
//!   verb: https://github.com/verbose/verb
//! registry: https://registry.npmjs.org
//! timeout_ms: 10000
//! options:
//!   fallback: true
//! ```

use crate::append::Options;
use crate::error::ConfigError;
use crate::lookup::{DEFAULT_REGISTRY, DEFAULT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_CONFIG: &str = "reflint.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Names requested for every document
    pub reflinks: Vec<String>,
    /// Known definitions, consulted before the registry
    pub links: BTreeMap<String, String>,
    /// Registry base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
    /// Registry request timeout in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Forwarded to the lookup untouched
    pub options: Map<String, Value>,
}

impl Config {
    pub fn parse(yaml: &str, path: &Path) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path`, or `reflint.yaml` in the working directory when no path
    /// is given. Only an explicitly named file has to exist.
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p, true),
            None => (Path::new(DEFAULT_CONFIG), false),
        };

        if !path.exists() {
            if required {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            return Ok(Self::default());
        }

        let yaml = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Self::parse(&yaml, path)
    }

    pub fn registry(&self) -> &str {
        self.registry.as_deref().unwrap_or(DEFAULT_REGISTRY)
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS)
    }

    /// Transform options: preset names plus pass-through lookup options
    pub fn to_options(&self) -> Options {
        Options {
            reflinks: self.reflinks.clone(),
            passthrough: self.options.clone(),
        }
    }
}
