//! Proximity policy: mode transitions, distance tracking and the meeting latch

use crate::session::error::SessionError;
use crate::session::state::{Mode, SessionSnapshot, SessionState, MEETING_THRESHOLD};
use std::sync::Arc;

/// Callback interface for the presentation layer
pub trait SessionDelegate: Send + Sync {
    /// Called after every state change
    fn on_state_changed(&self, snapshot: SessionSnapshot);
    /// Called once per session, the first time a beacon is within the threshold
    fn on_meeting_detected(&self);
    /// A start attempt failed and the user should be told
    fn on_alert(&self, message: String);
}

/// Owns the [`SessionState`] and applies every mutation to it.
pub struct SessionMachine {
    state: SessionState,
    threshold: f64,
    delegate: Option<Arc<dyn SessionDelegate>>,
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new(MEETING_THRESHOLD)
    }
}

impl SessionMachine {
    pub fn new(threshold: f64) -> Self {
        Self {
            state: SessionState::default(),
            threshold,
            delegate: None,
        }
    }

    pub fn set_delegate(&mut self, delegate: Option<Arc<dyn SessionDelegate>>) {
        self.delegate = delegate;
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Fail if a role has already been chosen
    pub fn ensure_unselected(&self) -> Result<(), SessionError> {
        match self.state.mode {
            Mode::Unselected => Ok(()),
            mode => Err(SessionError::ModeAlreadySelected(mode)),
        }
    }

    /// Move out of `Unselected` once the transport is running
    pub(crate) fn enter_mode(&mut self, mode: Mode, status: &str) -> Result<(), SessionError> {
        self.ensure_unselected()?;

        self.state.mode = mode;
        self.state.status_message = status.to_string();
        tracing::info!("Session mode: {}", mode);
        self.publish();
        Ok(())
    }

    pub(crate) fn set_status(&mut self, message: impl Into<String>) {
        self.state.status_message = message.into();
        self.publish();
    }

    pub(crate) fn alert(&self, message: String) {
        if let Some(delegate) = &self.delegate {
            delegate.on_alert(message);
        }
    }

    /// Apply a distance measurement.
    ///
    /// Returns true when this measurement triggered the meeting notification.
    pub fn on_beacon_event(&mut self, distance: f64) -> bool {
        if self.state.mode == Mode::Unselected {
            tracing::debug!("Beacon event before role selection, ignoring");
            return false;
        }

        self.state.last_distance = distance;

        let triggered = distance <= self.threshold && !self.state.meeting_triggered;
        if triggered {
            self.state.meeting_triggered = true;
            tracing::info!("Meeting detected at distance {:.3}", distance);
        } else {
            tracing::debug!("Beacon at distance {:.3}", distance);
        }

        self.publish();
        if triggered {
            if let Some(delegate) = &self.delegate {
                delegate.on_meeting_detected();
            }
        }
        triggered
    }

    /// Record a runtime transport error. Mode and latch are left alone.
    pub fn on_beacon_error(&mut self, message: String) {
        tracing::debug!("Transport status: {}", message);
        self.set_status(message);
    }

    /// Discard all state
    pub(crate) fn reset(&mut self) {
        self.state = SessionState::default();
    }

    fn publish(&self) {
        if let Some(delegate) = &self.delegate {
            delegate.on_state_changed(self.state.snapshot());
        }
    }
}
