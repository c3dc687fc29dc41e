/// BLE (Bluetooth Low Energy) Beacon Module
///
/// Protocol-level pieces of the beacon transport:
///
/// - **frame**: iBeacon-style manufacturer frame and the scan filter matching it
/// - **advertiser**: advertise settings for the room role
/// - **scanner**: scan settings, scan reports and RSSI ranging
/// - **radio**: `BeaconTransport` implementation over platform radio primitives
///
/// The platform side (Kotlin/Swift) only performs the actual radio calls; all
/// logic here is testable without BLE hardware.

pub mod advertiser;
pub mod frame;
pub mod radio;
pub mod scanner;

pub use advertiser::{AdvertiseMode, AdvertiseSettings, TxPowerLevel};
pub use frame::{
    BeaconFrame, FrameError, ScanFilter, BEACON_PREFIX, BEACON_UUID, DEFAULT_MAJOR,
    DEFAULT_MINOR, DEFAULT_TX_POWER, FRAME_LEN, MANUFACTURER_ID,
};
pub use radio::{
    Radio, RadioTransport, BROADCAST_FAILED_MESSAGE, BROADCAST_STARTED_MESSAGE,
    SCAN_FAILED_MESSAGE,
};
pub use scanner::{estimate_distance, ScanMode, ScanReport, ScanSettings, UNKNOWN_DISTANCE};
