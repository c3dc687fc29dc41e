/// Advertising settings for the room role

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvertiseMode {
    LowPower,
    Balanced,
    LowLatency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxPowerLevel {
    UltraLow,
    Low,
    Medium,
    High,
}

/// Advertise parameters handed to the radio
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvertiseSettings {
    pub mode: AdvertiseMode,
    pub connectable: bool,
    /// Advertising timeout in milliseconds; 0 advertises until stopped
    pub timeout_ms: u32,
    pub tx_power_level: TxPowerLevel,
}

impl Default for AdvertiseSettings {
    fn default() -> Self {
        Self {
            mode: AdvertiseMode::LowPower,
            connectable: false,
            timeout_ms: 0,
            tx_power_level: TxPowerLevel::Medium,
        }
    }
}
