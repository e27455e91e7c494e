//! Configuration module for the sweeper

use crate::discovery::DEFAULT_CONCURRENCY_LIMIT;
use crate::error::SweepError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Name of the per-user config file looked up in the home directory
pub const DEFAULT_CONFIG_FILE: &str = ".pingsweep.toml";

/// Main configuration structure for sweep operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Maximum number of probes in flight within one range
    pub concurrency_limit: usize,

    /// Per-probe wait in milliseconds
    pub probe_timeout_ms: u64,

    /// Ranges with more usable hosts than this are skipped
    pub max_hosts_per_range: u64,

    /// Ping executable used by the ICMP prober
    pub ping_program: String,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            probe_timeout_ms: 1000,
            max_hosts_per_range: 65536,
            ping_program: "ping".to_string(),
        }
    }
}

impl SweepConfig {
    pub fn with_concurrency(mut self, concurrency_limit: usize) -> Self {
        self.concurrency_limit = concurrency_limit;
        self
    }

    pub fn with_timeout(mut self, probe_timeout_ms: u64) -> Self {
        self.probe_timeout_ms = probe_timeout_ms;
        self
    }

    pub fn with_max_hosts(mut self, max_hosts_per_range: u64) -> Self {
        self.max_hosts_per_range = max_hosts_per_range;
        self
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Load configuration from TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SweepError::ConfigError(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: SweepConfig = toml::from_str(content)
            .map_err(|e| SweepError::ConfigError(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `~/.pingsweep.toml` if present, otherwise the defaults
    pub fn load_default_config() -> Self {
        let Some(path) = dirs::home_dir().map(|home| home.join(DEFAULT_CONFIG_FILE)) else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::from_toml_file(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.concurrency_limit == 0 {
            return Err(SweepError::ConfigError(
                "concurrency_limit must be greater than 0".to_string(),
            ));
        }

        if self.probe_timeout_ms == 0 {
            return Err(SweepError::ConfigError(
                "probe_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.max_hosts_per_range == 0 {
            return Err(SweepError::ConfigError(
                "max_hosts_per_range must be greater than 0".to_string(),
            ));
        }

        if self.ping_program.trim().is_empty() {
            return Err(SweepError::ConfigError("ping_program cannot be empty".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SweepConfig::default();
        assert_eq!(config.concurrency_limit, 100);
        assert_eq!(config.timeout_duration(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = SweepConfig::default()
            .with_concurrency(10)
            .with_timeout(250)
            .with_max_hosts(1024);
        assert_eq!(config.concurrency_limit, 10);
        assert_eq!(config.timeout_duration(), Duration::from_millis(250));
        assert_eq!(config.max_hosts_per_range, 1024);
    }

    #[test]
    fn test_validation_rejects_zero() {
        assert!(SweepConfig::default().with_concurrency(0).validate().is_err());
        assert!(SweepConfig::default().with_timeout(0).validate().is_err());
        assert!(SweepConfig::default().with_max_hosts(0).validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SweepConfig::from_toml_str("concurrency_limit = 32\n").unwrap();
        assert_eq!(config.concurrency_limit, 32);
        assert_eq!(config.probe_timeout_ms, 1000);
        assert_eq!(config.ping_program, "ping");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            SweepConfig::from_toml_str("concurrency_limit = \"many\""),
            Err(SweepError::ConfigError(_))
        ));
        assert!(matches!(
            SweepConfig::from_toml_str("concurrency_limit = 0"),
            Err(SweepError::ConfigError(_))
        ));
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "probe_timeout_ms = 500\nping_program = \"/bin/ping\"").unwrap();

        let config = SweepConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.probe_timeout_ms, 500);
        assert_eq!(config.ping_program, "/bin/ping");

        assert!(SweepConfig::from_toml_file("/nonexistent/pingsweep.toml").is_err());
    }
}
