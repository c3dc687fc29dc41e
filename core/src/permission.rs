//! Radio permission gate
//!
//! The platform asks the user for the Bluetooth permission once, before any
//! beacon operation. Anything other than an explicit grant ends the session
//! attempt; there is no automatic retry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// Denied and the platform will not prompt again
    NeverAskAgain,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

impl fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionStatus::Granted => write!(f, "granted"),
            PermissionStatus::Denied => write!(f, "denied"),
            PermissionStatus::NeverAskAgain => write!(f, "never_ask_again"),
        }
    }
}

/// Platform permission prompt
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PermissionGate: Send + Sync {
    async fn request_bluetooth_permission(&self) -> PermissionStatus;
}

/// Gate with a fixed answer, for platforms without runtime permissions
#[derive(Debug, Clone, Copy)]
pub struct StaticPermissionGate(pub PermissionStatus);

impl StaticPermissionGate {
    pub fn granted() -> Self {
        Self(PermissionStatus::Granted)
    }

    pub fn denied() -> Self {
        Self(PermissionStatus::Denied)
    }
}

#[async_trait]
impl PermissionGate for StaticPermissionGate {
    async fn request_bluetooth_permission(&self) -> PermissionStatus {
        self.0
    }
}
