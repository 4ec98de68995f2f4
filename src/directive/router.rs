//! Message router - parses inbound frames and dispatches by namespace

use super::handlers::{DirectiveHandler, Session};
use thermolink_shared::{codec, protocol, ResponseBody};
use tracing::{debug, info};

/// A handled request, ready for the emitter
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedResponse {
    pub request_id: String,
    pub body: ResponseBody,
}

/// Routes each frame to the registered handler
pub struct MessageRouter<H> {
    handler: H,
}

impl<H: DirectiveHandler> MessageRouter<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Parse and dispatch one raw frame
    ///
    /// Returns `None` when the frame is dropped: it does not parse, or it
    /// carries no correlation id to answer to.
    pub fn route_message(&mut self, session: &Session, raw: &str) -> Option<RoutedResponse> {
        let request = match codec::decode_request(raw) {
            Ok(request) => request,
            Err(e) => {
                debug!("Dropping frame: {}", e);
                return None;
            }
        };

        let header = &request.directive.header;
        let request_id = match request.correlation_id() {
            Some(id) => id.to_string(),
            None => {
                debug!(
                    "Dropping {}.{} without requestId (messageId={})",
                    header.namespace, header.name, header.message_id
                );
                return None;
            }
        };

        info!(
            "Directive {}.{} (requestId={})",
            header.namespace, header.name, request_id
        );

        let body = if header.namespace == protocol::DISCOVERY_NAMESPACE {
            self.handler.handle_discovery(session, &request)
        } else {
            self.handler.handle_directive(session, &request)
        };

        Some(RoutedResponse { request_id, body })
    }
}
