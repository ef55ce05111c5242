use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sharding::{DEFAULT_BUCKETS, DEFAULT_DICTIONARY, MAX_BUCKETS};
use crate::sharding::table::DEFAULT_VERSION;

/// What `HashRangeBucket` does with arguments of a type it cannot hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnsupportedTypePolicy {
    /// Leave them out of the hash (compatible with the existing mappings)
    #[default]
    Skip,
    /// Fail at bind time
    Reject,
}

/// Routing function settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Number of hash-range buckets
    pub bucket_count: u32,
    /// Mapping version used when the query sets no active version
    pub default_version: String,
    pub unsupported_types: UnsupportedTypePolicy,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKETS,
            default_version: DEFAULT_VERSION.to_string(),
            unsupported_types: UnsupportedTypePolicy::Skip,
        }
    }
}

/// Partition map dictionary settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryConfig {
    /// Registry name the shard resolver looks up
    pub name: String,
    /// CSV partition map; no source means the dictionary must be provided by the host
    pub source: Option<PathBuf>,
    /// Reload period of the partition map (default: 60s)
    pub refresh_interval_secs: u64,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_DICTIONARY.to_string(),
            source: None,
            refresh_interval_secs: 60,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub routing: RoutingConfig,
    pub dictionary: DictionaryConfig,
}

impl RouterConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: RouterConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file. A relative `dictionary.source` is resolved
    /// against the directory of the config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;

        if let (Some(source), Some(dir)) = (&config.dictionary.source, path.parent()) {
            if source.is_relative() {
                config.dictionary.source = Some(dir.join(source));
            }
        }

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.routing.bucket_count == 0 {
            return Err(ConfigError::Invalid(
                "routing.bucket_count must be at least 1".to_string(),
            ));
        }
        if self.routing.bucket_count > MAX_BUCKETS {
            return Err(ConfigError::Invalid(format!(
                "routing.bucket_count must be at most {}",
                MAX_BUCKETS
            )));
        }
        if self.routing.default_version.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "routing.default_version must not be empty".to_string(),
            ));
        }
        if self.dictionary.name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "dictionary.name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
