//! Session and beacon configuration
//!
//! Serializable to/from JSON so front ends can persist it alongside their own
//! settings.

use crate::session::state::MEETING_THRESHOLD;
use crate::transport::ble::frame::{
    BeaconFrame, BEACON_UUID, DEFAULT_MAJOR, DEFAULT_MINOR, DEFAULT_TX_POWER,
};
use crate::transport::events::DEFAULT_EVENT_QUEUE_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Invalid(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Identity of the advertised room beacon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconConfig {
    pub uuid: Uuid,
    pub major: u16,
    pub minor: u16,
    /// Calibrated tx power at one meter, in dBm
    pub tx_power: i8,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            uuid: BEACON_UUID,
            major: DEFAULT_MAJOR,
            minor: DEFAULT_MINOR,
            tx_power: DEFAULT_TX_POWER,
        }
    }
}

impl BeaconConfig {
    pub fn frame(&self) -> BeaconFrame {
        BeaconFrame::new(self.uuid)
            .with_major(self.major)
            .with_minor(self.minor)
            .with_tx_power(self.tx_power)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.uuid.is_nil() {
            return Err(ConfigError::Invalid("beacon uuid cannot be nil".to_string()));
        }
        // Ranging divides by tx power
        if self.tx_power >= 0 {
            return Err(ConfigError::Invalid(
                "tx_power must be a negative dBm value".to_string(),
            ));
        }
        Ok(())
    }
}

/// Proximity session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Largest distance at which a meeting is detected
    pub meeting_threshold: f64,
    /// Capacity of the transport event queue
    pub event_queue_capacity: usize,
    pub beacon: BeaconConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            meeting_threshold: MEETING_THRESHOLD,
            event_queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
            beacon: BeaconConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_meeting_threshold(mut self, threshold: f64) -> Self {
        self.meeting_threshold = threshold;
        self
    }

    pub fn with_event_queue_capacity(mut self, capacity: usize) -> Self {
        self.event_queue_capacity = capacity;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.meeting_threshold.is_finite() || self.meeting_threshold < 0.0 {
            return Err(ConfigError::Invalid(
                "meeting_threshold must be a non-negative number".to_string(),
            ));
        }

        if self.event_queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "event_queue_capacity must be >= 1".to_string(),
            ));
        }

        self.beacon.validate()
    }

    /// Load settings from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_string(&content)
    }

    /// Save settings to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = self.to_json_string()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        self.validate()?;
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_string(json: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
