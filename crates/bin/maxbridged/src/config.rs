//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `maxbridge.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use maxbridge_adapter_virtual::VirtualCubeConfig;
use maxbridge_app::bridge::{BridgeConfig, DEFAULT_ADDRESS, DEFAULT_PORT};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hub connection settings.
    pub hub: HubConfig,
    /// Bridge accessory and refresh loop settings.
    pub bridge: BridgeSection,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Devices of the simulated cube.
    #[serde(rename = "virtual")]
    pub virtual_cube: VirtualCubeConfig,
}

/// Where the MAX! Cube listens.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub address: String,
    /// TCP port.
    pub port: u16,
}

/// Bridge settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BridgeSection {
    /// Display name of the bridge accessory.
    pub name: String,
    /// Seconds between two hub refreshes.
    pub update_interval_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `maxbridge.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("maxbridge.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("MAXBRIDGE_HUB_ADDRESS") {
            self.hub.address = val;
        }
        if let Some(val) = var("MAXBRIDGE_HUB_PORT")
            && let Ok(port) = val.parse()
        {
            self.hub.port = port;
        }
        if let Some(val) = var("MAXBRIDGE_UPDATE_INTERVAL")
            && let Ok(secs) = val.parse()
        {
            self.bridge.update_interval_secs = secs;
        }
        if let Some(val) = var("MAXBRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.hub.address.trim().is_empty() {
            return Err(ConfigError::Validation(
                "hub address must not be empty".to_string(),
            ));
        }
        if self.hub.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.bridge.update_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "update interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings handed to the bridge.
    #[must_use]
    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            name: self.bridge.name.clone(),
            address: self.hub.address.clone(),
            port: self.hub.port,
            update_interval: Duration::from_secs(self.bridge.update_interval_secs),
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            name: "MaxBridge".to_string(),
            update_interval_secs: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "maxbridged=info,maxbridge_app=info,maxbridge_adapter_virtual=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.hub.address, "192.168.1.247");
        assert_eq!(config.hub.port, 62910);
        assert_eq!(config.bridge.name, "MaxBridge");
        assert_eq!(config.bridge.update_interval_secs, 60);
        assert_eq!(config.virtual_cube.devices.len(), 3);
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.hub.port, 62910);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [hub]
            address = '10.0.0.20'
            port = 62911

            [bridge]
            name = 'Upstairs'
            update_interval_secs = 30

            [logging]
            filter = 'debug'

            [virtual]
            timeout_every = 4

            [[virtual.devices]]
            serial = 'KEQ0523864'
            name = 'Office'
            target_temperature = 21.0
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.hub.address, "10.0.0.20");
        assert_eq!(config.hub.port, 62911);
        assert_eq!(config.bridge.name, "Upstairs");
        assert_eq!(config.bridge.update_interval_secs, 30);
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.virtual_cube.timeout_every, 4);
        assert_eq!(config.virtual_cube.devices.len(), 1);
        assert_eq!(config.virtual_cube.devices[0].serial, "KEQ0523864");
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [hub]
            port = 8080
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.hub.port, 8080);
        assert_eq!(config.hub.address, "192.168.1.247");
        assert_eq!(config.bridge.update_interval_secs, 60);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.hub.port, 62910);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_apply_environment_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("MAXBRIDGE_HUB_ADDRESS", "10.0.0.30"),
            ("MAXBRIDGE_HUB_PORT", "1234"),
            ("MAXBRIDGE_UPDATE_INTERVAL", "15"),
            ("MAXBRIDGE_LOG", "warn"),
        ]));

        assert_eq!(config.hub.address, "10.0.0.30");
        assert_eq!(config.hub.port, 1234);
        assert_eq!(config.bridge.update_interval_secs, 15);
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn should_prefer_rust_log_over_maxbridge_log() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("MAXBRIDGE_LOG", "warn"), ("RUST_LOG", "trace")]));
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_ignore_unparsable_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("MAXBRIDGE_HUB_PORT", "not-a-port"),
            ("MAXBRIDGE_UPDATE_INTERVAL", "-5"),
        ]));
        assert_eq!(config.hub.port, 62910);
        assert_eq!(config.bridge.update_interval_secs, 60);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.hub.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_update_interval() {
        let mut config = Config::default();
        config.bridge.update_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_empty_address() {
        let mut config = Config::default();
        config.hub.address = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_build_bridge_config() {
        let config = Config::default();
        let bridge = config.bridge_config();
        assert_eq!(bridge.address, "192.168.1.247");
        assert_eq!(bridge.port, 62910);
        assert_eq!(bridge.update_interval, Duration::from_secs(60));
        assert_eq!(bridge.name, "MaxBridge");
    }
}
