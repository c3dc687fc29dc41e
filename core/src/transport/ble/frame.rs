/// iBeacon-style manufacturer frame used to advertise a room
///
/// A room advertises a 24-byte manufacturer-specific payload: a two byte
/// beacon identifier, the 16-byte beacon UUID, major and minor numbers and the
/// calibrated transmit power that scanners use for ranging.

use thiserror::Error;
use uuid::Uuid;

/// Manufacturer id the frame is published under
pub const MANUFACTURER_ID: u16 = 224;

/// Beacon identifier at the start of every frame
pub const BEACON_PREFIX: [u8; 2] = [0xBE, 0xAC];

/// UUID shared by all SmartMeeting rooms
pub const BEACON_UUID: Uuid = Uuid::from_u128(0x0CF0_52C2_97CA_407C_84F8_B62A_AC4E_9020);

/// Length of an encoded frame
pub const FRAME_LEN: usize = 24;

/// Shortest frame a scanner can range against (everything up to tx power)
pub const MIN_FRAME_LEN: usize = 23;

pub const DEFAULT_MAJOR: u16 = 9;
pub const DEFAULT_MINOR: u16 = 6;

/// Calibrated tx power in dBm (0xB5)
pub const DEFAULT_TX_POWER: i8 = -75;

const UUID_OFFSET: usize = 2;
const MAJOR_OFFSET: usize = 18;
const MINOR_OFFSET: usize = 20;
const TX_POWER_OFFSET: usize = 22;

/// Errors for frame parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame too short: {0} bytes")]
    TooShort(usize),
    #[error("Missing beacon identifier")]
    BadPrefix,
    #[error("Beacon UUID mismatch")]
    UuidMismatch,
}

/// A decoded beacon frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeaconFrame {
    pub uuid: Uuid,
    pub major: u16,
    pub minor: u16,
    pub tx_power: i8,
}

impl Default for BeaconFrame {
    fn default() -> Self {
        Self::new(BEACON_UUID)
    }
}

impl BeaconFrame {
    /// Create a frame for `uuid` with the default major, minor and tx power
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            major: DEFAULT_MAJOR,
            minor: DEFAULT_MINOR,
            tx_power: DEFAULT_TX_POWER,
        }
    }

    pub fn with_major(mut self, major: u16) -> Self {
        self.major = major;
        self
    }

    pub fn with_minor(mut self, minor: u16) -> Self {
        self.minor = minor;
        self
    }

    pub fn with_tx_power(mut self, tx_power: i8) -> Self {
        self.tx_power = tx_power;
        self
    }

    /// Encode the manufacturer payload
    pub fn to_bytes(&self) -> [u8; FRAME_LEN] {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[..UUID_OFFSET].copy_from_slice(&BEACON_PREFIX);
        bytes[UUID_OFFSET..MAJOR_OFFSET].copy_from_slice(self.uuid.as_bytes());
        bytes[MAJOR_OFFSET..MINOR_OFFSET].copy_from_slice(&self.major.to_be_bytes());
        bytes[MINOR_OFFSET..TX_POWER_OFFSET].copy_from_slice(&self.minor.to_be_bytes());
        bytes[TX_POWER_OFFSET] = self.tx_power as u8;
        bytes
    }

    /// Decode a manufacturer payload. The trailing reserved byte is optional.
    pub fn parse(data: &[u8]) -> Result<Self, FrameError> {
        if data.len() < MIN_FRAME_LEN {
            return Err(FrameError::TooShort(data.len()));
        }
        if data[..UUID_OFFSET] != BEACON_PREFIX {
            return Err(FrameError::BadPrefix);
        }

        let mut uuid = [0u8; 16];
        uuid.copy_from_slice(&data[UUID_OFFSET..MAJOR_OFFSET]);

        Ok(Self {
            uuid: Uuid::from_bytes(uuid),
            major: u16::from_be_bytes([data[MAJOR_OFFSET], data[MAJOR_OFFSET + 1]]),
            minor: u16::from_be_bytes([data[MINOR_OFFSET], data[MINOR_OFFSET + 1]]),
            tx_power: data[TX_POWER_OFFSET] as i8,
        })
    }
}

/// Manufacturer-data filter a scanner installs so only rooms are reported.
///
/// The identifier and UUID bytes must match exactly; major, minor and tx
/// power are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFilter {
    manufacturer_id: u16,
    data: [u8; MIN_FRAME_LEN],
    mask: [u8; MIN_FRAME_LEN],
}

impl Default for ScanFilter {
    fn default() -> Self {
        Self::for_uuid(BEACON_UUID)
    }
}

impl ScanFilter {
    pub fn for_uuid(uuid: Uuid) -> Self {
        let mut data = [0u8; MIN_FRAME_LEN];
        data[..UUID_OFFSET].copy_from_slice(&BEACON_PREFIX);
        data[UUID_OFFSET..MAJOR_OFFSET].copy_from_slice(uuid.as_bytes());

        let mut mask = [0u8; MIN_FRAME_LEN];
        mask[..MAJOR_OFFSET].fill(0xFF);

        Self {
            manufacturer_id: MANUFACTURER_ID,
            data,
            mask,
        }
    }

    pub fn manufacturer_id(&self) -> u16 {
        self.manufacturer_id
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    /// Check a scanned manufacturer payload against the filter
    pub fn matches(&self, manufacturer_id: u16, payload: &[u8]) -> bool {
        if manufacturer_id != self.manufacturer_id || payload.len() < MIN_FRAME_LEN {
            return false;
        }
        self.data
            .iter()
            .zip(self.mask.iter())
            .zip(payload.iter())
            .all(|((expected, mask), actual)| expected & mask == actual & mask)
    }
}
