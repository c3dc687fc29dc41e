//! Session data model

use crate::transport::ble::scanner::UNKNOWN_DISTANCE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Distance at or below which two devices are considered to be meeting
pub const MEETING_THRESHOLD: f64 = 1.0;

/// Role the device plays in the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Unselected,
    /// Room: advertising the beacon
    Broadcasting,
    /// Attendee: scanning for rooms
    Listening,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Unselected => write!(f, "Unselected"),
            Mode::Broadcasting => write!(f, "Broadcasting"),
            Mode::Listening => write!(f, "Listening"),
        }
    }
}

/// Initialization phase of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Uninitialized,
    Ready,
    PermissionDenied,
    InitFailed(String),
    TornDown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Uninitialized => write!(f, "Uninitialized"),
            Phase::Ready => write!(f, "Ready"),
            Phase::PermissionDenied => write!(f, "PermissionDenied"),
            Phase::InitFailed(reason) => write!(f, "InitFailed({})", reason),
            Phase::TornDown => write!(f, "TornDown"),
        }
    }
}

/// Mutable session state. Only the session machine writes it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub mode: Mode,
    /// [`UNKNOWN_DISTANCE`] until the first measurement
    pub last_distance: f64,
    /// Latched once a meeting has been detected
    pub meeting_triggered: bool,
    /// Last error or transport status, for display
    pub status_message: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            mode: Mode::Unselected,
            last_distance: UNKNOWN_DISTANCE,
            meeting_triggered: false,
            status_message: String::new(),
        }
    }
}

impl SessionState {
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            mode: self.mode,
            last_distance: self.last_distance,
            meeting_triggered: self.meeting_triggered,
            status_message: self.status_message.clone(),
        }
    }
}

/// Read-only view handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub mode: Mode,
    pub last_distance: f64,
    pub meeting_triggered: bool,
    pub status_message: String,
}

impl SessionSnapshot {
    /// Whether a distance has been measured yet
    pub fn has_distance(&self) -> bool {
        self.mode != Mode::Unselected && self.last_distance >= 0.0
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_distance() {
            write!(
                f,
                "[{}] distance: {:.2} | {}",
                self.mode, self.last_distance, self.status_message
            )
        } else {
            write!(f, "[{}] distance: - | {}", self.mode, self.status_message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = SessionState::default();
        assert_eq!(state.mode, Mode::Unselected);
        assert_eq!(state.last_distance, -1.0);
        assert!(!state.meeting_triggered);
        assert!(state.status_message.is_empty());
    }

    #[test]
    fn test_distance_meaningless_while_unselected() {
        let mut state = SessionState::default();
        state.last_distance = 2.0;
        assert!(!state.snapshot().has_distance());

        state.mode = Mode::Listening;
        assert!(state.snapshot().has_distance());
    }

    #[test]
    fn test_snapshot_display() {
        let state = SessionState {
            mode: Mode::Listening,
            last_distance: 0.5,
            meeting_triggered: true,
            status_message: "listening".to_string(),
        };
        assert_eq!(
            state.snapshot().to_string(),
            "[Listening] distance: 0.50 | listening"
        );
        assert_eq!(
            SessionState::default().snapshot().to_string(),
            "[Unselected] distance: - | "
        );
    }

    #[test]
    fn test_snapshot_json() {
        let json = SessionState::default()
            .snapshot()
            .to_json()
            .expect("serialize");
        assert!(json.contains("\"mode\":\"Unselected\""));
        assert!(json.contains("\"last_distance\":-1.0"));
    }
}
