//! Thermolink Shared Protocol Types
//!
//! This crate provides the directive/response data model, the JSON text
//! codec and the thermostat state machine used by the edge client.

pub mod codec;
pub mod message;
pub mod state_machine;

use chrono::{SecondsFormat, Utc};

pub use message::*;
pub use state_machine::{
    DeviceState, LocalChange, ThermostatDirective, ThermostatMode, TransitionResult, UnknownMode,
};

/// Current UTC time as an RFC 3339 timestamp with millisecond precision
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Protocol constants
pub mod protocol {
    /// Namespace routed to the discovery handler
    pub const DISCOVERY_NAMESPACE: &str = "Alexa.Discovery";

    /// Namespace of state reports, responses and errors
    pub const ALEXA_NAMESPACE: &str = "Alexa";

    pub const THERMOSTAT_NAMESPACE: &str = "Alexa.ThermostatController";

    pub const TEMPERATURE_SENSOR_NAMESPACE: &str = "Alexa.TemperatureSensor";

    /// Payload version stamped on every event header
    pub const PAYLOAD_VERSION: &str = "3";

    /// Appended to the directive's messageId to form the reply messageId
    pub const MESSAGE_ID_SUFFIX: &str = "-r";

    /// Uncertainty attached to every reported property
    pub const UNCERTAINTY_MS: u32 = 1000;

    /// Fixed delay between reconnect attempts
    pub const RECONNECT_INTERVAL_MS: u64 = 5000;

    pub const CAPABILITY_TYPE: &str = "AlexaInterface";

    pub const INTERFACE_VERSION: &str = "3";
}

/// Builder helpers for creating messages
impl EventHeader {
    /// Create the header of a reply to `directive`
    ///
    /// The messageId is derived from the directive's and the correlation
    /// token is copied through only when the directive carried one.
    pub fn reply_to(
        directive: &DirectiveHeader,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            message_id: format!("{}{}", directive.message_id, protocol::MESSAGE_ID_SUFFIX),
            correlation_token: directive.correlation_token.clone(),
            payload_version: protocol::PAYLOAD_VERSION.into(),
        }
    }

    /// Create the header of a device-initiated event with a fresh messageId
    pub fn proactive(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            message_id: uuid::Uuid::new_v4().to_string(),
            correlation_token: None,
            payload_version: protocol::PAYLOAD_VERSION.into(),
        }
    }
}

impl Property {
    /// Temperature sensor reading
    pub fn temperature(value: f64, time_of_sample: impl Into<String>) -> Self {
        Self::celsius(
            protocol::TEMPERATURE_SENSOR_NAMESPACE,
            "temperature",
            value,
            time_of_sample,
        )
    }

    /// Thermostat target setpoint
    pub fn target_setpoint(value: f64, time_of_sample: impl Into<String>) -> Self {
        Self::celsius(
            protocol::THERMOSTAT_NAMESPACE,
            "targetSetpoint",
            value,
            time_of_sample,
        )
    }

    /// Thermostat mode, reported as a bare string value
    pub fn thermostat_mode(mode: ThermostatMode, time_of_sample: impl Into<String>) -> Self {
        Self {
            namespace: protocol::THERMOSTAT_NAMESPACE.into(),
            name: "thermostatMode".into(),
            value: PropertyValue::Mode(mode),
            time_of_sample: time_of_sample.into(),
            uncertainty_in_milliseconds: protocol::UNCERTAINTY_MS,
        }
    }

    fn celsius(
        namespace: &str,
        name: &str,
        value: f64,
        time_of_sample: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            value: PropertyValue::Temperature(Temperature {
                value,
                scale: TemperatureScale::Celsius,
            }),
            time_of_sample: time_of_sample.into(),
            uncertainty_in_milliseconds: protocol::UNCERTAINTY_MS,
        }
    }
}
