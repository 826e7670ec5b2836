use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{CacheError, Result};

/// Cache construction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of keys resident in the memory tier. Must be at
    /// least 1.
    pub capacity: usize,
    /// Passed through to the durable-tier collaborator so several cache
    /// instances can share one storage backend. The collaborator appends
    /// its own unique suffix either way, so leaving this unset is safe.
    pub namespace: Option<String>,
    /// Directory used by the bundled disk tier.
    pub data_dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 50,
            namespace: None,
            data_dir: PathBuf::from("./data/strata"),
        }
    }
}

impl CacheConfig {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Load configuration from YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: CacheConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Reject configurations the cache cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfiguration(
                "capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
