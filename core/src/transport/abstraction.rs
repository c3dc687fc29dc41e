//! Beacon transport abstraction
//!
//! Defines the contract the proximity session depends on: start/stop primitives
//! for the two radio roles and the events a transport emits while running.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The two kinds of asynchronous events a beacon transport emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Distance measurements
    Beacon,
    /// Errors and transport status notices
    Error,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Beacon => write!(f, "Beacon"),
            EventKind::Error => write!(f, "Error"),
        }
    }
}

/// Events from the beacon transport to the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransportEvent {
    /// A proximity measurement, in the unit the transport reports
    Beacon { distance: f64 },
    /// A runtime error or status notice. `code` carries the radio error code when there is one.
    Error { message: String, code: Option<i32> },
}

impl TransportEvent {
    pub fn beacon(distance: f64) -> Self {
        TransportEvent::Beacon { distance }
    }

    pub fn error(message: impl Into<String>) -> Self {
        TransportEvent::Error {
            message: message.into(),
            code: None,
        }
    }

    pub fn error_with_code(message: impl Into<String>, code: i32) -> Self {
        TransportEvent::Error {
            message: message.into(),
            code: Some(code),
        }
    }

    /// The listener channel this event is delivered on
    pub fn kind(&self) -> EventKind {
        match self {
            TransportEvent::Beacon { .. } => EventKind::Beacon,
            TransportEvent::Error { .. } => EventKind::Error,
        }
    }
}

impl fmt::Display for TransportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportEvent::Beacon { distance } => write!(f, "Beacon {{ distance: {:.3} }}", distance),
            TransportEvent::Error {
                message,
                code: Some(code),
            } => write!(f, "Error {{ message: {}, code: {} }}", message, code),
            TransportEvent::Error { message, code: None } => {
                write!(f, "Error {{ message: {} }}", message)
            }
        }
    }
}

/// Errors returned by beacon transport operations
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TransportError {
    #[error("Bluetooth is not available")]
    NotAvailable,

    #[error("It is already listening")]
    AlreadyListening,

    #[error("It is already broadcasting")]
    AlreadyBroadcasting,

    #[error("Radio error: {0}")]
    Radio(String),
}

/// Radio primitives the session drives.
///
/// `broadcast` and `listen` resolve once the radio mode is actually running.
/// The stop operations must be idempotent and are a no-op when the role is
/// not active. Events are not returned from here; implementations publish
/// them through an [`EventEmitter`](crate::transport::EventEmitter).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BeaconTransport: Send + Sync {
    /// Prepare the radio subsystem
    async fn init(&self) -> Result<(), TransportError>;

    /// Start advertising the room beacon
    async fn broadcast(&self) -> Result<(), TransportError>;

    /// Start scanning for room beacons
    async fn listen(&self) -> Result<(), TransportError>;

    async fn stop_broadcast(&self) -> Result<(), TransportError>;

    async fn stop_listen(&self) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_display() {
        assert_eq!(EventKind::Beacon.to_string(), "Beacon");
        assert_eq!(EventKind::Error.to_string(), "Error");
    }

    #[test]
    fn test_event_kind_routing() {
        assert_eq!(TransportEvent::beacon(0.5).kind(), EventKind::Beacon);
        assert_eq!(TransportEvent::error("Scan failed").kind(), EventKind::Error);
    }

    #[test]
    fn test_event_display_includes_code() {
        let event = TransportEvent::error_with_code("Scan failed", 2);
        assert_eq!(event.to_string(), "Error { message: Scan failed, code: 2 }");

        let event = TransportEvent::error("Broadcasting started");
        assert_eq!(event.to_string(), "Error { message: Broadcasting started }");
    }

    #[test]
    fn test_transport_error_messages() {
        assert_eq!(
            TransportError::NotAvailable.to_string(),
            "Bluetooth is not available"
        );
        assert_eq!(
            TransportError::AlreadyListening.to_string(),
            "It is already listening"
        );
        assert_eq!(
            TransportError::Radio("busy".to_string()).to_string(),
            "Radio error: busy"
        );
    }
}
