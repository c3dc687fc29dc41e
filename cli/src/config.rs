// Configuration management for the SmartMeeting CLI
//
// Cross-platform config stored in:
// - macOS: ~/Library/Application Support/smartmeeting/config.json
// - Linux: ~/.config/smartmeeting/config.json
// - Windows: %APPDATA%\smartmeeting\config.json

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use smartmeeting_core::SessionConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Session and beacon settings handed to the core
    pub session: SessionConfig,

    /// Write logs to a daily-rolling file in this directory instead of stderr
    pub log_dir: Option<String>,

    /// Delay between replayed scan readings, in milliseconds
    pub scan_interval_ms: u64,

    /// Answer the meeting prompt with OK instead of Cancel
    pub auto_join: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            log_dir: None,
            scan_interval_ms: 500,
            auto_join: false,
        }
    }
}

impl Config {
    /// Get the config directory path (cross-platform)
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("smartmeeting");

        std::fs::create_dir_all(&config_dir)
            .context("Failed to create config directory")?;

        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from the default location, creating it on first use
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file()?)
    }

    /// Load config from `path`, or create a default one there if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .context("Failed to read config file")?;
            let config: Config = serde_json::from_str(&contents)
                .context("Failed to parse config file")?;
            config
                .session
                .validate()
                .context("Invalid session settings in config file")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(path, contents)
            .context("Failed to write config file")?;
        Ok(())
    }

    /// Set a config value. The result is validated but not saved; a rejected
    /// value leaves the config unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        match key {
            "meeting_threshold" => {
                updated.session.meeting_threshold = value.parse()
                    .context("Invalid number")?;
            }
            "event_queue_capacity" => {
                updated.session.event_queue_capacity = value.parse()
                    .context("Invalid number")?;
            }
            "beacon_uuid" => {
                updated.session.beacon.uuid = value.parse()
                    .context("Invalid UUID")?;
            }
            "beacon_major" => {
                updated.session.beacon.major = value.parse()
                    .context("Invalid major number")?;
            }
            "beacon_minor" => {
                updated.session.beacon.minor = value.parse()
                    .context("Invalid minor number")?;
            }
            "beacon_tx_power" => {
                updated.session.beacon.tx_power = value.parse()
                    .context("Invalid tx power")?;
            }
            "log_dir" => {
                updated.log_dir = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "scan_interval_ms" => {
                updated.scan_interval_ms = value.parse()
                    .context("Invalid number")?;
            }
            "auto_join" => {
                updated.auto_join = value.parse()
                    .context("Invalid boolean value")?;
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        updated.session.validate()?;
        *self = updated;
        Ok(())
    }

    /// Get a config value
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "meeting_threshold" => Some(self.session.meeting_threshold.to_string()),
            "event_queue_capacity" => Some(self.session.event_queue_capacity.to_string()),
            "beacon_uuid" => Some(self.session.beacon.uuid.to_string()),
            "beacon_major" => Some(self.session.beacon.major.to_string()),
            "beacon_minor" => Some(self.session.beacon.minor.to_string()),
            "beacon_tx_power" => Some(self.session.beacon.tx_power.to_string()),
            "log_dir" => self.log_dir.clone(),
            "scan_interval_ms" => Some(self.scan_interval_ms.to_string()),
            "auto_join" => Some(self.auto_join.to_string()),
            _ => None,
        }
    }

    /// List all config values
    pub fn list(&self) -> Vec<(String, String)> {
        vec![
            ("meeting_threshold".to_string(), self.session.meeting_threshold.to_string()),
            ("event_queue_capacity".to_string(), self.session.event_queue_capacity.to_string()),
            ("beacon_uuid".to_string(), self.session.beacon.uuid.to_string()),
            ("beacon_major".to_string(), self.session.beacon.major.to_string()),
            ("beacon_minor".to_string(), self.session.beacon.minor.to_string()),
            ("beacon_tx_power".to_string(), format!("{} dBm", self.session.beacon.tx_power)),
            ("log_dir".to_string(), self.log_dir.clone().unwrap_or_else(|| "(stderr)".to_string())),
            ("scan_interval_ms".to_string(), format!("{}ms", self.scan_interval_ms)),
            ("auto_join".to_string(), self.auto_join.to_string()),
        ]
    }
}
