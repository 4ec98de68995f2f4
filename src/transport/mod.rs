pub mod traits;
pub mod websocket;

#[cfg(test)]
pub mod memory;

pub use traits::{TransportAdapter, TransportEvent, TransportTarget};
pub use websocket::WebSocketTransport;
