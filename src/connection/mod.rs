//! Connection management for the relay session
//!
//! This module handles:
//! - Building the authenticated relay address from device credentials
//! - Driving the transport and routing each inbound frame to the handler
//! - Sending replies and device-initiated change reports

mod manager;

pub use manager::{ConnectionConfig, ConnectionManager, ConnectionStatus, DEFAULT_HOST};
