//! Proximity session: role selection, distance tracking and the one-shot
//! meeting notification.

pub mod error;
pub mod lifecycle;
pub mod machine;
pub mod state;

pub use error::SessionError;
pub use lifecycle::{ProximitySession, Role, PERMISSION_DENIED_MESSAGE};
pub use machine::{SessionDelegate, SessionMachine};
pub use state::{Mode, Phase, SessionSnapshot, SessionState, MEETING_THRESHOLD};
