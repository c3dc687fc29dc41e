//! Proximity session lifecycle
//!
//! Wires the permission gate, the beacon transport and the event queue around
//! a [`SessionMachine`]. The session is the only writer of session state:
//! role selection, event processing and teardown all take `&mut self`, and
//! transport events are applied strictly in the order they were queued.

use crate::config::SessionConfig;
use crate::permission::PermissionGate;
use crate::session::error::SessionError;
use crate::session::machine::{SessionDelegate, SessionMachine};
use crate::session::state::{Mode, Phase, SessionSnapshot};
use crate::transport::{
    event_queue, BeaconTransport, EventEmitter, EventKind, EventReceiver, Subscription,
    TransportEvent,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Status shown when the radio permission was refused
pub const PERMISSION_DENIED_MESSAGE: &str = "Bluetooth permission denied";

/// Role chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Broadcasts the room beacon
    Room,
    /// Scans for room beacons
    Attendee,
}

impl Role {
    pub fn mode(self) -> Mode {
        match self {
            Role::Room => Mode::Broadcasting,
            Role::Attendee => Mode::Listening,
        }
    }

    /// Status message once the role's radio mode is running
    pub fn started_message(self) -> &'static str {
        match self {
            Role::Room => "broadcasting",
            Role::Attendee => "listening",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Room => write!(f, "Room"),
            Role::Attendee => write!(f, "Attendee"),
        }
    }
}

pub struct ProximitySession {
    id: Uuid,
    config: SessionConfig,
    transport: Arc<dyn BeaconTransport>,
    permission: Arc<dyn PermissionGate>,
    emitter: EventEmitter,
    machine: SessionMachine,
    phase: Phase,
    events: Option<EventReceiver>,
    subscriptions: Vec<Subscription>,
}

impl ProximitySession {
    /// Create an uninitialized session. No permission or radio call is made
    /// until [`init`](Self::init).
    pub fn new(
        config: SessionConfig,
        transport: Arc<dyn BeaconTransport>,
        permission: Arc<dyn PermissionGate>,
        emitter: EventEmitter,
    ) -> Self {
        let machine = SessionMachine::new(config.meeting_threshold);
        Self {
            id: Uuid::new_v4(),
            config,
            transport,
            permission,
            emitter,
            machine,
            phase: Phase::Uninitialized,
            events: None,
            subscriptions: Vec::new(),
        }
    }

    pub fn set_delegate(&mut self, delegate: Option<Arc<dyn SessionDelegate>>) {
        self.machine.set_delegate(delegate);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn mode(&self) -> Mode {
        self.machine.mode()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.machine.snapshot()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // LIFECYCLE
    // ------------------------------------------------------------------------

    /// Request the radio permission, prepare the transport and subscribe to
    /// its events.
    ///
    /// A denied permission is final for this session. A failed radio init
    /// may be retried by calling `init` again.
    pub async fn init(&mut self) -> Result<(), SessionError> {
        match &self.phase {
            Phase::Uninitialized | Phase::InitFailed(_) => {}
            Phase::Ready => return Ok(()),
            Phase::PermissionDenied => return Err(SessionError::PermissionDenied),
            Phase::TornDown => return Err(SessionError::SessionClosed),
        }

        let permission = self.permission.request_bluetooth_permission().await;
        if !permission.is_granted() {
            tracing::warn!("Bluetooth permission {}, session {} cannot start", permission, self.id);
            self.phase = Phase::PermissionDenied;
            self.machine.set_status(PERMISSION_DENIED_MESSAGE);
            return Err(SessionError::PermissionDenied);
        }

        if let Err(e) = self.transport.init().await {
            tracing::error!("Beacon transport init failed: {}", e);
            self.phase = Phase::InitFailed(e.to_string());
            self.machine.set_status(e.to_string());
            return Err(SessionError::InitFailure(e.to_string()));
        }

        let (tx, rx) = event_queue(self.config.event_queue_capacity);
        self.subscriptions
            .push(self.emitter.add_listener(EventKind::Beacon, tx.clone()));
        self.subscriptions
            .push(self.emitter.add_listener(EventKind::Error, tx));
        self.events = Some(rx);
        self.phase = Phase::Ready;

        tracing::info!("Session {} ready", self.id);
        Ok(())
    }

    /// Start broadcasting as the room
    pub async fn select_room(&mut self) -> Result<(), SessionError> {
        self.select(Role::Room).await
    }

    /// Start listening as an attendee
    pub async fn select_attendee(&mut self) -> Result<(), SessionError> {
        self.select(Role::Attendee).await
    }

    pub async fn select(&mut self, role: Role) -> Result<(), SessionError> {
        self.ensure_ready()?;
        self.machine.ensure_unselected()?;

        let started = match role {
            Role::Room => self.transport.broadcast().await,
            Role::Attendee => self.transport.listen().await,
        };

        match started {
            Ok(()) => self.machine.enter_mode(role.mode(), role.started_message()),
            Err(e) => {
                tracing::warn!("Failed to start {} role: {}", role, e);
                self.machine.alert(e.to_string());
                Err(SessionError::TransportStartFailure(e))
            }
        }
    }

    /// Stop everything and discard the session state.
    ///
    /// Safe from any phase, including before `init` and after a previous
    /// teardown. Subscriptions are removed before the radio is stopped, and
    /// events still queued are dropped unprocessed.
    pub async fn teardown(&mut self) {
        if self.phase == Phase::TornDown {
            return;
        }

        for subscription in self.subscriptions.drain(..) {
            subscription.remove();
        }
        if let Some(mut events) = self.events.take() {
            events.close();
        }

        let (listen, broadcast) = futures::join!(
            self.transport.stop_listen(),
            self.transport.stop_broadcast()
        );
        if let Err(e) = listen {
            tracing::debug!("stop_listen during teardown: {}", e);
        }
        if let Err(e) = broadcast {
            tracing::debug!("stop_broadcast during teardown: {}", e);
        }

        self.machine.reset();
        self.phase = Phase::TornDown;
        tracing::info!("Session {} torn down", self.id);
    }

    // ------------------------------------------------------------------------
    // EVENT PROCESSING
    // ------------------------------------------------------------------------

    /// Wait for the next transport event and apply it.
    ///
    /// Returns `None` when the session has no open event queue.
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        let events = self.events.as_mut()?;
        let event = events.recv().await?;
        self.apply(&event);
        Some(event)
    }

    /// Apply every event already queued, without waiting. Returns how many
    /// were applied.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.events.as_mut().and_then(|rx| rx.try_recv().ok()) {
            self.apply(&event);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, event: &TransportEvent) {
        if self.phase != Phase::Ready {
            tracing::trace!("Stale event {} after teardown", event);
            return;
        }
        match event {
            TransportEvent::Beacon { distance } => {
                self.machine.on_beacon_event(*distance);
            }
            TransportEvent::Error { message, .. } => {
                self.machine.on_beacon_error(message.clone());
            }
        }
    }

    fn ensure_ready(&mut self) -> Result<(), SessionError> {
        match &self.phase {
            Phase::Ready => Ok(()),
            Phase::Uninitialized => Err(SessionError::NotInitialized),
            Phase::PermissionDenied => {
                self.machine.set_status(PERMISSION_DENIED_MESSAGE);
                Err(SessionError::PermissionDenied)
            }
            Phase::InitFailed(reason) => Err(SessionError::InitFailure(reason.clone())),
            Phase::TornDown => Err(SessionError::SessionClosed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::{MockPermissionGate, PermissionStatus, StaticPermissionGate};
    use crate::transport::abstraction::MockBeaconTransport;
    use crate::transport::TransportError;

    fn ready_transport() -> MockBeaconTransport {
        let mut transport = MockBeaconTransport::new();
        transport.expect_init().times(1).returning(|| Ok(()));
        transport.expect_stop_listen().returning(|| Ok(()));
        transport.expect_stop_broadcast().returning(|| Ok(()));
        transport
    }

    fn session_with(transport: MockBeaconTransport, permission: PermissionStatus) -> ProximitySession {
        ProximitySession::new(
            SessionConfig::default(),
            Arc::new(transport),
            Arc::new(StaticPermissionGate(permission)),
            EventEmitter::new(),
        )
    }

    #[tokio::test]
    async fn test_denied_permission_makes_no_transport_calls() {
        let mut transport = MockBeaconTransport::new();
        transport.expect_init().times(0);
        transport.expect_broadcast().times(0);
        transport.expect_listen().times(0);
        transport.expect_stop_listen().returning(|| Ok(()));
        transport.expect_stop_broadcast().returning(|| Ok(()));

        let mut session = session_with(transport, PermissionStatus::Denied);

        assert_eq!(session.init().await, Err(SessionError::PermissionDenied));
        assert_eq!(session.select_room().await, Err(SessionError::PermissionDenied));
        assert_eq!(session.select_attendee().await, Err(SessionError::PermissionDenied));
        assert_eq!(session.mode(), Mode::Unselected);
        assert_eq!(session.snapshot().status_message, PERMISSION_DENIED_MESSAGE);
        assert_eq!(session.phase(), &Phase::PermissionDenied);

        session.teardown().await;
    }

    #[tokio::test]
    async fn test_permission_requested_once() {
        let mut gate = MockPermissionGate::new();
        gate.expect_request_bluetooth_permission()
            .times(1)
            .returning(|| PermissionStatus::Granted);

        let mut session = ProximitySession::new(
            SessionConfig::default(),
            Arc::new(ready_transport()),
            Arc::new(gate),
            EventEmitter::new(),
        );

        session.init().await.expect("first init");
        session.init().await.expect("init is idempotent once ready");
    }

    #[tokio::test]
    async fn test_select_room_broadcasts() {
        let mut transport = ready_transport();
        transport.expect_broadcast().times(1).returning(|| Ok(()));
        transport.expect_listen().times(0);

        let mut session = session_with(transport, PermissionStatus::Granted);
        session.init().await.expect("init");
        session.select_room().await.expect("room");

        assert_eq!(session.mode(), Mode::Broadcasting);
        assert_eq!(session.snapshot().status_message, "broadcasting");
    }

    #[tokio::test]
    async fn test_roles_are_mutually_exclusive() {
        let mut transport = ready_transport();
        transport.expect_listen().times(1).returning(|| Ok(()));
        transport.expect_broadcast().times(0);

        let mut session = session_with(transport, PermissionStatus::Granted);
        session.init().await.expect("init");
        session.select_attendee().await.expect("attendee");

        assert_eq!(
            session.select_room().await,
            Err(SessionError::ModeAlreadySelected(Mode::Listening))
        );
        assert_eq!(
            session.select_attendee().await,
            Err(SessionError::ModeAlreadySelected(Mode::Listening))
        );
        assert_eq!(session.mode(), Mode::Listening);
        assert_eq!(session.snapshot().status_message, "listening");
    }

    #[tokio::test]
    async fn test_start_failure_keeps_mode_unselected() {
        let mut transport = ready_transport();
        transport
            .expect_listen()
            .times(1)
            .returning(|| Err(TransportError::Radio("radio busy".to_string())));

        let mut session = session_with(transport, PermissionStatus::Granted);
        session.init().await.expect("init");

        assert_eq!(
            session.select_attendee().await,
            Err(SessionError::TransportStartFailure(TransportError::Radio(
                "radio busy".to_string()
            )))
        );
        assert_eq!(session.mode(), Mode::Unselected);
    }

    #[tokio::test]
    async fn test_select_before_init_rejected() {
        let mut transport = MockBeaconTransport::new();
        transport.expect_listen().times(0);
        let mut session = session_with(transport, PermissionStatus::Granted);

        assert_eq!(session.select_attendee().await, Err(SessionError::NotInitialized));
    }

    #[tokio::test]
    async fn test_init_failure_blocks_selection_until_retried() {
        let mut transport = MockBeaconTransport::new();
        let mut attempts = 0;
        transport.expect_init().times(2).returning(move || {
            attempts += 1;
            if attempts == 1 {
                Err(TransportError::NotAvailable)
            } else {
                Ok(())
            }
        });
        transport.expect_listen().times(1).returning(|| Ok(()));

        let mut session = session_with(transport, PermissionStatus::Granted);

        assert_eq!(
            session.init().await,
            Err(SessionError::InitFailure("Bluetooth is not available".to_string()))
        );
        assert_eq!(
            session.select_attendee().await,
            Err(SessionError::InitFailure("Bluetooth is not available".to_string()))
        );
        assert_eq!(session.snapshot().status_message, "Bluetooth is not available");

        session.init().await.expect("retry");
        session.select_attendee().await.expect("attendee");
    }

    #[tokio::test]
    async fn test_teardown_before_init_is_safe() {
        let mut transport = MockBeaconTransport::new();
        transport.expect_stop_listen().times(1).returning(|| Ok(()));
        transport.expect_stop_broadcast().times(1).returning(|| Ok(()));

        let mut session = session_with(transport, PermissionStatus::Granted);
        session.teardown().await;
        session.teardown().await;

        assert_eq!(session.phase(), &Phase::TornDown);
        assert_eq!(session.init().await, Err(SessionError::SessionClosed));
    }

    #[tokio::test]
    async fn test_teardown_ignores_stop_errors() {
        let mut transport = MockBeaconTransport::new();
        transport
            .expect_stop_listen()
            .times(1)
            .returning(|| Err(TransportError::NotAvailable));
        transport
            .expect_stop_broadcast()
            .times(1)
            .returning(|| Err(TransportError::NotAvailable));

        let mut session = session_with(transport, PermissionStatus::Granted);
        session.teardown().await;
        assert_eq!(session.phase(), &Phase::TornDown);
    }

    #[tokio::test]
    async fn test_events_processed_in_order() {
        let emitter = EventEmitter::new();
        let mut transport = ready_transport();
        transport.expect_listen().returning(|| Ok(()));

        let mut session = ProximitySession::new(
            SessionConfig::default(),
            Arc::new(transport),
            Arc::new(StaticPermissionGate::granted()),
            emitter.clone(),
        );
        session.init().await.expect("init");
        session.select_attendee().await.expect("attendee");

        emitter.emit(TransportEvent::beacon(4.0));
        emitter.emit(TransportEvent::error("Scan failed"));
        emitter.emit(TransportEvent::beacon(0.8));

        assert_eq!(session.next_event().await, Some(TransportEvent::beacon(4.0)));
        assert_eq!(session.snapshot().last_distance, 4.0);
        assert_eq!(session.process_pending(), 2);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.last_distance, 0.8);
        assert_eq!(snapshot.status_message, "Scan failed");
        assert!(snapshot.meeting_triggered);
    }

    #[tokio::test]
    async fn test_no_events_after_teardown() {
        let emitter = EventEmitter::new();
        let mut transport = ready_transport();
        transport.expect_broadcast().returning(|| Ok(()));

        let mut session = ProximitySession::new(
            SessionConfig::default(),
            Arc::new(transport),
            Arc::new(StaticPermissionGate::granted()),
            emitter.clone(),
        );
        session.init().await.expect("init");
        session.select_room().await.expect("room");
        emitter.emit(TransportEvent::beacon(0.5));

        session.teardown().await;

        assert_eq!(emitter.listener_count(EventKind::Beacon), 0);
        assert_eq!(emitter.listener_count(EventKind::Error), 0);
        assert_eq!(emitter.emit(TransportEvent::beacon(0.2)), 0);
        assert_eq!(session.next_event().await, None);
        assert_eq!(session.process_pending(), 0);
        assert_eq!(session.mode(), Mode::Unselected);
        assert!(!session.snapshot().meeting_triggered);
    }
}
