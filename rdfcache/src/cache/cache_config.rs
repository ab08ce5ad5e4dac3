// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache configuration and presets

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::CacheError;

/// Default number of graphs kept resident
pub const DEFAULT_MAX_ENTRIES: usize = 8;
/// Default idle time after which a graph is logically expired
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(10 * 60);
/// Default interval between background sweeps
pub const DEFAULT_SWEEP_PERIOD: Duration = Duration::from_secs(60);
/// Default wait for an in-flight sweep during shutdown
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Graph cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached graphs
    pub max_entries: usize,

    /// Idle time after which an entry is no longer served
    pub idle_timeout: Duration,

    /// Interval of the background sweep removing expired entries
    pub sweep_period: Duration,

    /// How long shutdown waits for a running sweep before aborting it
    pub shutdown_grace: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            sweep_period: DEFAULT_SWEEP_PERIOD,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

impl CacheConfig {
    /// Create configuration for memory-constrained hosts: fewer, shorter-lived graphs
    pub fn memory_constrained() -> Self {
        Self {
            max_entries: 2,
            idle_timeout: Duration::from_secs(2 * 60),
            sweep_period: Duration::from_secs(30),
            ..Self::default()
        }
    }

    /// Create configuration for read-heavy hosts with plenty of memory
    pub fn read_optimized() -> Self {
        Self {
            max_entries: 32,
            idle_timeout: Duration::from_secs(30 * 60),
            ..Self::default()
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn with_sweep_period(mut self, sweep_period: Duration) -> Self {
        self.sweep_period = sweep_period;
        self
    }

    pub fn with_shutdown_grace(mut self, shutdown_grace: Duration) -> Self {
        self.shutdown_grace = shutdown_grace;
        self
    }

    /// Build configuration from environment variables, falling back to defaults
    ///
    /// # Environment Variables
    /// - `RDFCACHE_MAX_ENTRIES`: cached graph limit (default: 8)
    /// - `RDFCACHE_IDLE_TIMEOUT_SECS`: idle expiry (default: 600)
    /// - `RDFCACHE_SWEEP_PERIOD_SECS`: sweep interval (default: 60)
    /// - `RDFCACHE_SHUTDOWN_GRACE_SECS`: shutdown wait (default: 5)
    pub fn from_env() -> Result<Self, CacheError> {
        let defaults = Self::default();

        let config = Self {
            max_entries: env_value("RDFCACHE_MAX_ENTRIES")?.unwrap_or(defaults.max_entries),
            idle_timeout: env_value("RDFCACHE_IDLE_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.idle_timeout),
            sweep_period: env_value("RDFCACHE_SWEEP_PERIOD_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_period),
            shutdown_grace: env_value("RDFCACHE_SHUTDOWN_GRACE_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.shutdown_grace),
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.max_entries == 0 {
            return Err(CacheError::InvalidConfig(
                "max_entries must be greater than 0".to_string(),
            ));
        }

        if self.idle_timeout.is_zero() {
            return Err(CacheError::InvalidConfig(
                "idle_timeout must be greater than 0".to_string(),
            ));
        }

        if self.sweep_period.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep_period must be greater than 0".to_string(),
            ));
        }

        if self.sweep_period > self.idle_timeout {
            log::warn!(
                "Sweep period {:?} exceeds idle timeout {:?}; expired graphs will linger",
                self.sweep_period,
                self.idle_timeout
            );
        }

        Ok(())
    }
}

fn env_value<T: std::str::FromStr>(name: &str) -> Result<Option<T>, CacheError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CacheError::InvalidConfig(format!("{} has invalid value '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}
