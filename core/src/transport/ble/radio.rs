/// Beacon transport over platform radio primitives
///
/// The platform (Kotlin/Swift or a simulator) implements [`Radio`] and feeds
/// radio callbacks back into [`RadioTransport`], which turns them into
/// [`TransportEvent`]s on the shared emitter.

use crate::config::BeaconConfig;
use crate::transport::abstraction::{BeaconTransport, TransportError, TransportEvent};
use crate::transport::ble::advertiser::AdvertiseSettings;
use crate::transport::ble::frame::{BeaconFrame, ScanFilter, MANUFACTURER_ID};
use crate::transport::ble::scanner::{ScanReport, ScanSettings, UNKNOWN_DISTANCE};
use crate::transport::events::EventEmitter;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// Status notice emitted once advertising is running
pub const BROADCAST_STARTED_MESSAGE: &str = "Broadcasting started";
pub const BROADCAST_FAILED_MESSAGE: &str = "Broadcasting failed";
pub const SCAN_FAILED_MESSAGE: &str = "Scan failed";

/// Low-level radio operations supplied by the platform
pub trait Radio: Send + Sync {
    /// Whether a radio adapter is present on this device
    fn is_available(&self) -> bool;

    fn start_advertising(
        &self,
        settings: &AdvertiseSettings,
        manufacturer_id: u16,
        payload: &[u8],
    ) -> Result<(), String>;
    fn stop_advertising(&self);

    fn start_scan(&self, filter: &ScanFilter, settings: &ScanSettings) -> Result<(), String>;
    fn stop_scan(&self);
}

#[derive(Debug, Default)]
struct RadioState {
    initialized: bool,
    listening: bool,
    broadcasting: bool,
}

/// [`BeaconTransport`] implementation backed by a [`Radio`]
pub struct RadioTransport {
    radio: Arc<dyn Radio>,
    emitter: EventEmitter,
    frame: BeaconFrame,
    filter: ScanFilter,
    advertise_settings: AdvertiseSettings,
    scan_settings: ScanSettings,
    state: Mutex<RadioState>,
}

impl RadioTransport {
    /// Create a transport advertising and scanning for the default room frame
    pub fn new(radio: Arc<dyn Radio>, emitter: EventEmitter) -> Self {
        Self {
            radio,
            emitter,
            frame: BeaconFrame::default(),
            filter: ScanFilter::default(),
            advertise_settings: AdvertiseSettings::default(),
            scan_settings: ScanSettings::default(),
            state: Mutex::new(RadioState::default()),
        }
    }

    /// Create a transport for the frame described by `config`
    pub fn from_config(radio: Arc<dyn Radio>, emitter: EventEmitter, config: &BeaconConfig) -> Self {
        Self::new(radio, emitter).with_frame(config.frame())
    }

    /// Advertise `frame` and only report rooms sharing its UUID
    pub fn with_frame(mut self, frame: BeaconFrame) -> Self {
        self.filter = ScanFilter::for_uuid(frame.uuid);
        self.frame = frame;
        self
    }

    pub fn frame(&self) -> &BeaconFrame {
        &self.frame
    }

    pub fn is_listening(&self) -> bool {
        self.state.lock().listening
    }

    pub fn is_broadcasting(&self) -> bool {
        self.state.lock().broadcasting
    }

    // ------------------------------------------------------------------------
    // RADIO CALLBACKS
    // ------------------------------------------------------------------------

    /// An advertisement was seen while scanning
    pub fn on_scan_result(&self, report: ScanReport) {
        if !self.is_listening() {
            tracing::trace!("Scan result while not listening, ignoring");
            return;
        }
        if !report.matches(&self.filter) {
            tracing::trace!("Scan result for foreign beacon, ignoring");
            return;
        }

        match report.estimate_distance() {
            Ok(distance) if distance == UNKNOWN_DISTANCE => {
                tracing::trace!("Beacon without signal reading, ignoring");
            }
            Ok(distance) => {
                tracing::debug!("Ranged beacon at {:.3} (rssi {})", distance, report.rssi);
                self.emitter.emit(TransportEvent::beacon(distance));
            }
            Err(e) => tracing::debug!("Unrangeable beacon frame: {}", e),
        }
    }

    pub fn on_scan_failed(&self, code: i32) {
        tracing::warn!("Scan failed with code {}", code);
        self.emitter
            .emit(TransportEvent::error_with_code(SCAN_FAILED_MESSAGE, code));
    }

    pub fn on_advertise_started(&self) {
        tracing::info!("Advertising started");
        self.emitter.emit(TransportEvent::error(BROADCAST_STARTED_MESSAGE));
    }

    pub fn on_advertise_failed(&self, code: i32) {
        tracing::warn!("Advertising failed with code {}", code);
        self.emitter
            .emit(TransportEvent::error_with_code(BROADCAST_FAILED_MESSAGE, code));
    }
}

#[async_trait]
impl BeaconTransport for RadioTransport {
    async fn init(&self) -> Result<(), TransportError> {
        if !self.radio.is_available() {
            return Err(TransportError::NotAvailable);
        }
        self.state.lock().initialized = true;
        tracing::debug!("Radio transport initialized");
        Ok(())
    }

    async fn broadcast(&self) -> Result<(), TransportError> {
        {
            let mut state = self.state.lock();
            if !state.initialized {
                return Err(TransportError::NotAvailable);
            }
            if state.broadcasting {
                return Err(TransportError::AlreadyBroadcasting);
            }
            state.broadcasting = true;
        }

        // The radio may call back into the transport before returning
        let started = self.radio.start_advertising(
            &self.advertise_settings,
            MANUFACTURER_ID,
            &self.frame.to_bytes(),
        );
        if let Err(e) = started {
            self.state.lock().broadcasting = false;
            return Err(TransportError::Radio(e));
        }
        Ok(())
    }

    async fn listen(&self) -> Result<(), TransportError> {
        {
            let mut state = self.state.lock();
            if !state.initialized {
                return Err(TransportError::NotAvailable);
            }
            if state.listening {
                return Err(TransportError::AlreadyListening);
            }
            state.listening = true;
        }

        if let Err(e) = self.radio.start_scan(&self.filter, &self.scan_settings) {
            self.state.lock().listening = false;
            return Err(TransportError::Radio(e));
        }
        Ok(())
    }

    async fn stop_broadcast(&self) -> Result<(), TransportError> {
        let was_broadcasting = std::mem::replace(&mut self.state.lock().broadcasting, false);
        if was_broadcasting {
            self.radio.stop_advertising();
        }
        Ok(())
    }

    async fn stop_listen(&self) -> Result<(), TransportError> {
        let was_listening = std::mem::replace(&mut self.state.lock().listening, false);
        if was_listening {
            self.radio.stop_scan();
        }
        Ok(())
    }
}
