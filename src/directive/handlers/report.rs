//! State report and change report builders

use super::Session;
use thermolink_shared::{
    now_iso8601, protocol, CauseType, Change, ChangeCause, Context, DeviceState, Event,
    EventEndpoint, EventHeader, EventPayload, LocalChange, Property, Request, Response,
};

/// The three context properties in their fixed order:
/// temperature, target setpoint, mode
fn properties(temperature: f64, state: &DeviceState, time_of_sample: &str) -> [Property; 3] {
    [
        Property::temperature(temperature, time_of_sample),
        Property::target_setpoint(state.target_temperature, time_of_sample),
        Property::thermostat_mode(state.current_mode, time_of_sample),
    ]
}

/// Full state report answering `request`
///
/// `temperature` is the freshly sampled sensor value; the setpoint and mode
/// come from `state`.
pub fn state_report(
    session: &Session,
    request: &Request,
    namespace: &str,
    name: &str,
    temperature: f64,
    state: &DeviceState,
) -> Response {
    let time_of_sample = request.request_time.clone().unwrap_or_else(now_iso8601);

    Response {
        event: Event {
            header: EventHeader::reply_to(&request.directive.header, namespace, name),
            endpoint: EventEndpoint {
                endpoint_id: session.device_id.clone(),
            },
            payload: EventPayload::Empty {},
        },
        context: Some(Context {
            properties: properties(temperature, state, &time_of_sample).to_vec(),
        }),
    }
}

/// Proactive `ChangeReport` for a change made at the device
///
/// The changed property goes in the event payload, the others in context.
pub fn change_report(
    session: &Session,
    change: LocalChange,
    temperature: f64,
    state: &DeviceState,
) -> Response {
    let [sensor, target, mode] = properties(temperature, state, &now_iso8601());

    let (changed, unchanged) = match change {
        LocalChange::TargetTemperature(_) => (target, vec![sensor, mode]),
        LocalChange::Mode(_) => (mode, vec![sensor, target]),
    };

    Response {
        event: Event {
            header: EventHeader::proactive(protocol::ALEXA_NAMESPACE, "ChangeReport"),
            endpoint: EventEndpoint {
                endpoint_id: session.device_id.clone(),
            },
            payload: EventPayload::Change {
                change: Change {
                    cause: ChangeCause {
                        kind: CauseType::PhysicalInteraction,
                    },
                    properties: vec![changed],
                },
            },
        },
        context: Some(Context {
            properties: unchanged,
        }),
    }
}
