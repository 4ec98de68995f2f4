//! Directive processing for the thermostat endpoint
//!
//! This module handles:
//! - Parsing inbound frames and dropping the ones that cannot be answered
//! - Dispatching discovery and capability directives to the registered handler
//! - Building state reports, discovery descriptions and error replies
//! - Serializing replies back onto the transport

pub mod emitter;
pub mod handlers;
mod router;

pub use handlers::{
    DeviceProfile, DirectiveHandler, Session, ThermostatConfig, ThermostatHandler,
    UnhandledDirectivePolicy,
};
pub use router::{MessageRouter, RoutedResponse};
