use crate::controller::shaping::DEFAULT_DEADZONE;
use crate::mapping::{MappingEntry, MappingError, MappingTable};
use crate::session::SessionSettings;
use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = "padbridge";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Invalid button mapping: {0}")]
    Mapping(#[from] MappingError),
}

/// Runtime settings, read once at startup
///
/// Every field is optional in the file; missing fields keep their defaults.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    /// Which connected gamepad to open
    pub device_index: usize,
    pub tick_rate_hz: u32,
    pub deadzone: f32,
    pub diagnostic_interval_ms: u64,
    pub reconnect_attempts: u32,
    pub reconnect_delay_ms: u64,
    pub fault_backoff_ms: u64,
    pub verbose: bool,
    /// Case-insensitive name fragments a Joy-Con is expected to match
    pub device_name_hints: Vec<String>,
    pub virtual_device_name: String,
    /// Empty means the built-in Joy-Con table
    pub mapping: Vec<MappingEntry>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            tick_rate_hz: 120,
            deadzone: DEFAULT_DEADZONE,
            diagnostic_interval_ms: 500,
            reconnect_attempts: 1,
            reconnect_delay_ms: 500,
            fault_backoff_ms: 100,
            verbose: false,
            device_name_hints: vec!["joy-con".to_string(), "nintendo switch".to_string()],
            virtual_device_name: "Microsoft X-Box 360 pad (padbridge)".to_string(),
            mapping: Vec::new(),
        }
    }
}

impl BridgeConfig {
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| {
                warn!("Could not determine config directory, using current directory");
                PathBuf::from(".")
            })
            .join(CONFIG_DIR)
            .join(CONFIG_FILE)
    }

    /// Loads the config file, falling back to defaults when it does not exist
    pub async fn load() -> Result<Self> {
        let path = Self::path();
        if !tokio::fs::try_exists(&path)
            .await
            .map_err(|e| eyre!("Failed to check config file {}: {}", path.display(), e))?
        {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| eyre!("{} ({})", e, path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        debug!("Parsed config: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate_hz == 0 {
            return Err(ConfigError::Invalid {
                field: "tick_rate_hz",
                reason: "must be greater than 0".to_string(),
            });
        }
        if !(0.0..1.0).contains(&self.deadzone) {
            return Err(ConfigError::Invalid {
                field: "deadzone",
                reason: format!("{} is outside [0.0, 1.0)", self.deadzone),
            });
        }
        if self.reconnect_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "reconnect_attempts",
                reason: "at least one attempt is required".to_string(),
            });
        }
        if self.virtual_device_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "virtual_device_name",
                reason: "must not be empty".to_string(),
            });
        }
        self.mapping_table()?;
        Ok(())
    }

    pub fn mapping_table(&self) -> Result<MappingTable, MappingError> {
        if self.mapping.is_empty() {
            Ok(MappingTable::default())
        } else {
            MappingTable::from_entries(self.mapping.iter().copied())
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate_hz.max(1)
    }

    pub fn diagnostic_interval(&self) -> Duration {
        Duration::from_millis(self.diagnostic_interval_ms)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            device_index: self.device_index,
            tick_interval: self.tick_interval(),
            reconnect_attempts: self.reconnect_attempts,
            reconnect_delay: Duration::from_millis(self.reconnect_delay_ms),
            fault_backoff: Duration::from_millis(self.fault_backoff_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{Action, LogicalButton, TriggerSide};

    #[test]
    fn empty_file_gives_defaults() {
        let config = BridgeConfig::from_toml_str("").unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.mapping_table().unwrap(), MappingTable::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = BridgeConfig::from_toml_str("tick_rate_hz = 60\nverbose = true\n").unwrap();
        assert_eq!(config.tick_rate_hz, 60);
        assert!(config.verbose);
        assert_eq!(config.deadzone, DEFAULT_DEADZONE);
        assert_eq!(config.reconnect_attempts, 1);
    }

    #[test]
    fn custom_mapping_is_parsed() {
        let content = r#"
            [[mapping]]
            index = 0
            action = { button = "b" }

            [[mapping]]
            index = 1
            action = { button = "a" }

            [[mapping]]
            index = 7
            action = { trigger = "right" }
        "#;
        let table = BridgeConfig::from_toml_str(content)
            .unwrap()
            .mapping_table()
            .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup(0), Some(Action::Button(LogicalButton::B)));
        assert_eq!(table.lookup(7), Some(Action::Trigger(TriggerSide::Right)));
        assert_eq!(table.lookup(2), None);
    }

    #[test]
    fn duplicate_mapping_index_is_rejected() {
        let content = r#"
            [[mapping]]
            index = 3
            action = { button = "x" }

            [[mapping]]
            index = 3
            action = { button = "y" }
        "#;
        assert_eq!(
            BridgeConfig::from_toml_str(content),
            Err(ConfigError::Mapping(MappingError::DuplicateIndex(3)))
        );
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        for content in [
            "tick_rate_hz = 0",
            "deadzone = 1.0",
            "deadzone = -0.1",
            "reconnect_attempts = 0",
            "virtual_device_name = \"  \"",
        ] {
            assert!(
                matches!(
                    BridgeConfig::from_toml_str(content),
                    Err(ConfigError::Invalid { .. })
                ),
                "{}",
                content
            );
        }
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        assert!(matches!(
            BridgeConfig::from_toml_str("tick_rate_hz = \"fast\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn session_settings_follow_config() {
        let config = BridgeConfig {
            device_index: 1,
            tick_rate_hz: 100,
            reconnect_attempts: 4,
            reconnect_delay_ms: 250,
            ..BridgeConfig::default()
        };
        let settings = config.session_settings();
        assert_eq!(settings.device_index, 1);
        assert_eq!(settings.tick_interval, Duration::from_millis(10));
        assert_eq!(settings.reconnect_attempts, 4);
        assert_eq!(settings.reconnect_delay, Duration::from_millis(250));
        assert_eq!(settings.fault_backoff, Duration::from_millis(100));
    }

    #[test]
    fn path_ends_in_app_directory() {
        let path = BridgeConfig::path();
        assert!(path.ends_with("padbridge/config.toml"));
    }
}
