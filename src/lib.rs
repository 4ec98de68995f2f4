//! Thermostat edge client for the voice-assistant websocket relay
//!
//! The device keeps one websocket open to the relay, answers discovery and
//! thermostat directives with state reports, and drives the physical
//! hardware through [`hardware::HardwareCallbacks`].

pub mod connection;
pub mod directive;
pub mod hardware;
pub mod transport;

pub use connection::{ConnectionConfig, ConnectionManager, ConnectionStatus};
pub use directive::{
    DeviceProfile, DirectiveHandler, Session, ThermostatConfig, ThermostatHandler,
    UnhandledDirectivePolicy,
};
pub use hardware::HardwareCallbacks;
pub use transport::{TransportAdapter, TransportEvent, WebSocketTransport};
