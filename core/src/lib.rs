// SmartMeeting Core — proximity session
#![allow(clippy::empty_line_after_doc_comments)]
//
// A room broadcasts a beacon, attendees scan for it, and once an attendee is
// close enough the session offers to join the meeting. Exactly once.

pub mod config;
pub mod permission;
pub mod session;
pub mod transport;

pub use config::{BeaconConfig, ConfigError, SessionConfig};
pub use permission::{PermissionGate, PermissionStatus, StaticPermissionGate};
pub use session::{
    Mode, Phase, ProximitySession, Role, SessionDelegate, SessionError, SessionSnapshot,
    MEETING_THRESHOLD,
};
pub use transport::{
    BeaconTransport, EventEmitter, EventKind, Radio, RadioTransport, ScanReport, TransportError,
    TransportEvent,
};
