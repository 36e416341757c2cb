//! Storage configuration.
//!
//! ```rust
//! use document_hydrator::StoreConfig;
//!
//! let config = StoreConfig::from_json(r#"{ "max_age_secs": 60 }"#).unwrap();
//! assert_eq!(config.max_age_secs, 60);
//! assert_eq!(config.namespace, "HydratorStorage:");
//! ```

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_NAMESPACE: &str = "HydratorStorage:";
pub const DEFAULT_EXPIRY_INDEX_KEY: &str = "hydrator.expiries";
pub const DEFAULT_MAX_AGE_SECS: u64 = 5 * 60;

pub const ENV_CACHE_DIR: &str = "HYDRATOR_CACHE_DIR";
pub const ENV_MAX_AGE_SECS: &str = "HYDRATOR_CACHE_MAX_AGE_SECS";

/// Settings for [`RawStorage`](crate::RawStorage).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Prefix put in front of every URI when written to durable storage.
    pub namespace: String,
    /// Durable key holding the write timestamps of all namespaced entries.
    pub expiry_index_key: String,
    /// Entries older than this are treated as absent.
    pub max_age_secs: u64,
    /// Directory for the file-backed durable store. `None` keeps everything in memory.
    pub cache_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            expiry_index_key: DEFAULT_EXPIRY_INDEX_KEY.to_string(),
            max_age_secs: DEFAULT_MAX_AGE_SECS,
            cache_dir: None,
        }
    }
}

impl StoreConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Defaults overlaid with `HYDRATOR_CACHE_DIR` and `HYDRATOR_CACHE_MAX_AGE_SECS`.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(ENV_CACHE_DIR).filter(|dir| !dir.is_empty()) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = lookup(ENV_MAX_AGE_SECS) {
            match raw.parse() {
                Ok(secs) => self.max_age_secs = secs,
                Err(_) => warn!(value = %raw, "Ignoring invalid {}", ENV_MAX_AGE_SECS),
            }
        }
        self
    }

    pub fn max_age(&self) -> TimeDelta {
        i64::try_from(self.max_age_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }

    /// The durable key for `uri`.
    pub fn storage_key(&self, uri: &str) -> String {
        format!("{}{}", self.namespace, uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.max_age(), TimeDelta::seconds(300));
        assert_eq!(config.storage_key("/api/posts"), "HydratorStorage:/api/posts");
        assert!(config.cache_dir.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = StoreConfig::from_json(r#"{ "namespace": "app:", "cache_dir": "/tmp/x" }"#).unwrap();
        assert_eq!(config.namespace, "app:");
        assert_eq!(config.expiry_index_key, DEFAULT_EXPIRY_INDEX_KEY);
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [(ENV_CACHE_DIR, "/var/cache/h"), (ENV_MAX_AGE_SECS, "30")].into();
        let config = StoreConfig::default().with_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.cache_dir, Some(PathBuf::from("/var/cache/h")));
        assert_eq!(config.max_age_secs, 30);
    }

    #[test]
    fn test_invalid_max_age_override_is_ignored() {
        let config = StoreConfig::default().with_overrides(|k| (k == ENV_MAX_AGE_SECS).then(|| "soon".to_string()));
        assert_eq!(config.max_age_secs, DEFAULT_MAX_AGE_SECS);
    }
}
