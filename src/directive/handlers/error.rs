//! Replies for directives the thermostat cannot carry out

use super::Session;
use thermolink_shared::{
    protocol, ErrorType, Event, EventEndpoint, EventHeader, EventPayload, Request, Response,
    ResponseBody, UnhandledEvent,
};

/// How unknown or unusable directives are answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnhandledDirectivePolicy {
    /// Bare `{"error": ...}` body with no event envelope, as deployed
    /// devices have always answered
    #[default]
    Legacy,
    /// Structured `Alexa.ErrorResponse` event
    ErrorResponse,
}

/// Build the error reply for `request` under `policy`
pub fn error_body(
    policy: UnhandledDirectivePolicy,
    session: &Session,
    request: &Request,
    kind: ErrorType,
    message: &str,
) -> ResponseBody {
    match policy {
        UnhandledDirectivePolicy::Legacy => ResponseBody::Unhandled(UnhandledEvent {
            error: legacy_message(kind).into(),
        }),
        UnhandledDirectivePolicy::ErrorResponse => ResponseBody::Event(Response {
            event: Event {
                header: EventHeader::reply_to(
                    &request.directive.header,
                    protocol::ALEXA_NAMESPACE,
                    "ErrorResponse",
                ),
                endpoint: EventEndpoint {
                    endpoint_id: session.device_id.clone(),
                },
                payload: EventPayload::Error {
                    kind,
                    message: message.into(),
                },
            },
            context: None,
        }),
    }
}

fn legacy_message(kind: ErrorType) -> &'static str {
    match kind {
        ErrorType::InvalidDirective => "Unhandled Event",
        ErrorType::InvalidValue => "Invalid Value",
    }
}
