// Scripted radio for running sessions without BLE hardware
//
// The radio accepts start/stop requests and remembers what is running. Scan
// readings are injected by the caller through `RadioTransport` callbacks.

use parking_lot::Mutex;
use smartmeeting_core::transport::ble::{AdvertiseSettings, Radio, ScanFilter, ScanSettings};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RadioActivity {
    pub advertising: bool,
    pub scanning: bool,
}

pub struct ScriptedRadio {
    available: bool,
    activity: Mutex<RadioActivity>,
}

impl ScriptedRadio {
    pub fn new(available: bool) -> Self {
        Self {
            available,
            activity: Mutex::new(RadioActivity::default()),
        }
    }

    pub fn activity(&self) -> RadioActivity {
        *self.activity.lock()
    }
}

impl Radio for ScriptedRadio {
    fn is_available(&self) -> bool {
        self.available
    }

    fn start_advertising(
        &self,
        settings: &AdvertiseSettings,
        manufacturer_id: u16,
        payload: &[u8],
    ) -> Result<(), String> {
        tracing::debug!(
            "Advertising {} bytes under manufacturer {} ({:?})",
            payload.len(),
            manufacturer_id,
            settings.mode
        );
        self.activity.lock().advertising = true;
        Ok(())
    }

    fn stop_advertising(&self) {
        tracing::debug!("Advertising stopped");
        self.activity.lock().advertising = false;
    }

    fn start_scan(&self, filter: &ScanFilter, settings: &ScanSettings) -> Result<(), String> {
        tracing::debug!(
            "Scanning for manufacturer {} ({:?})",
            filter.manufacturer_id(),
            settings.scan_mode
        );
        self.activity.lock().scanning = true;
        Ok(())
    }

    fn stop_scan(&self) {
        tracing::debug!("Scan stopped");
        self.activity.lock().scanning = false;
    }
}
