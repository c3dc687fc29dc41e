// Transport module — beacon radio abstraction and BLE implementation

pub mod abstraction;
pub mod ble;
pub mod events;

pub use abstraction::{BeaconTransport, EventKind, TransportError, TransportEvent};
pub use ble::{Radio, RadioTransport, ScanReport};
pub use events::{
    event_queue, EventEmitter, EventReceiver, EventSender, Subscription,
    DEFAULT_EVENT_QUEUE_CAPACITY,
};
