/// Scanner settings and RSSI ranging
///
/// Scanning reports every matching advertisement immediately in low-power
/// mode. Each report is turned into a distance estimate using the tx power the
/// room put in its frame.

use crate::transport::ble::frame::{BeaconFrame, FrameError, ScanFilter};
use serde::{Deserialize, Serialize};

/// Distance reported when a measurement cannot be ranged
pub const UNKNOWN_DISTANCE: f64 = -1.0;

/// Radio scan mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanMode {
    LowPower,
    Balanced,
    LowLatency,
}

/// Scan parameters handed to the radio
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Batch delay in milliseconds; 0 reports each result immediately
    pub report_delay_ms: u64,
    pub scan_mode: ScanMode,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            report_delay_ms: 0,
            scan_mode: ScanMode::LowPower,
        }
    }
}

/// One advertisement seen by the radio
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub manufacturer_id: u16,
    /// Manufacturer-specific data
    pub payload: Vec<u8>,
    /// Received signal strength in dBm
    pub rssi: i16,
}

impl ScanReport {
    pub fn new(manufacturer_id: u16, payload: Vec<u8>, rssi: i16) -> Self {
        Self {
            manufacturer_id,
            payload,
            rssi,
        }
    }

    /// Whether the report passes `filter`
    pub fn matches(&self, filter: &ScanFilter) -> bool {
        filter.matches(self.manufacturer_id, &self.payload)
    }

    /// Range the report against the tx power carried in its frame
    pub fn estimate_distance(&self) -> Result<f64, FrameError> {
        let frame = BeaconFrame::parse(&self.payload)?;
        Ok(estimate_distance(frame.tx_power, self.rssi))
    }
}

/// Estimate distance from calibrated tx power and measured RSSI.
///
/// Returns [`UNKNOWN_DISTANCE`] when there is no signal reading.
pub fn estimate_distance(tx_power: i8, rssi: i16) -> f64 {
    if rssi == 0 || tx_power == 0 {
        return UNKNOWN_DISTANCE;
    }

    let ratio = f64::from(rssi) / f64::from(tx_power);
    if ratio < 1.0 {
        ratio.powi(10)
    } else {
        0.89976 * ratio.powf(7.7095) + 0.111
    }
}
