//! Ordering configuration
//!
//! Sources, later overriding earlier:
//! 1. Built-in defaults
//! 2. `ordering.toml`, `ordering.yaml`, `ordering.json` in the given directory
//! 3. Environment variables prefixed `TASKBOARD_ORDERING_`

use crate::error::Result;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "TASKBOARD_ORDERING_";

/// Base name of configuration files
pub const CONFIG_FILE_STEM: &str = "ordering";

/// Settings for [`OrderingService`](crate::OrderingService)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingConfig {
    /// SQLite database file. `None` keeps records in memory.
    pub database: Option<PathBuf>,
    /// Upper bound on waiting for a container lock
    pub lock_timeout_ms: u64,
    /// Rebalance once and retry when a placement runs out of rank space
    pub auto_rebalance: bool,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            database: None,
            lock_timeout_ms: 5000,
            auto_rebalance: true,
        }
    }
}

impl OrderingConfig {
    /// Figment with every source for `dir` merged in precedence order
    pub fn figment(dir: impl AsRef<Path>) -> Figment {
        let dir = dir.as_ref();
        Figment::new()
            .merge(Serialized::defaults(OrderingConfig::default()))
            .merge(Toml::file(dir.join(format!("{}.toml", CONFIG_FILE_STEM))))
            .merge(Yaml::file(dir.join(format!("{}.yaml", CONFIG_FILE_STEM))))
            .merge(Json::file(dir.join(format!("{}.json", CONFIG_FILE_STEM))))
            .merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().into()))
    }

    /// Load configuration for `dir`. Missing files are skipped.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let config: OrderingConfig = Self::figment(dir).extract()?;
        debug!(dir = %dir.display(), ?config, "loaded ordering config");
        Ok(config)
    }

    /// Set the database file
    pub fn with_database(mut self, path: impl Into<PathBuf>) -> Self {
        self.database = Some(path.into());
        self
    }

    /// Set the lock timeout
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Enable or disable automatic rebalancing
    pub fn with_auto_rebalance(mut self, enabled: bool) -> Self {
        self.auto_rebalance = enabled;
        self
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}
