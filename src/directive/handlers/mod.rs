//! Directive handlers and the registration contract they implement

mod discovery;
mod error;
mod report;
mod thermostat;

pub use discovery::{describe_endpoint, SUPPORTED_MODES};
pub use error::{error_body, UnhandledDirectivePolicy};
pub use report::{change_report, state_report};
pub use thermostat::{DeviceProfile, ThermostatConfig, ThermostatHandler};

use thermolink_shared::{LocalChange, Request, Response, ResponseBody};

/// Connection-scoped context passed to every handler call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Endpoint id of this device, fixed at connect time
    pub device_id: String,
}

impl Session {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
        }
    }
}

/// What the embedding application registers with the connection manager
///
/// Discovery requests go to [`handle_discovery`](Self::handle_discovery),
/// every other namespace to [`handle_directive`](Self::handle_directive).
pub trait DirectiveHandler: Send {
    fn handle_discovery(&mut self, session: &Session, request: &Request) -> ResponseBody;

    fn handle_directive(&mut self, session: &Session, request: &Request) -> ResponseBody;

    /// Build a proactive event for a change made at the device itself
    ///
    /// Returns `None` when there is nothing to report.
    fn handle_local_change(&mut self, _session: &Session, _change: LocalChange) -> Option<Response> {
        None
    }
}
