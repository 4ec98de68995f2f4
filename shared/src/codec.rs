//! JSON text codec for relay frames
//!
//! Every websocket text frame carries exactly one JSON document:
//! ```text
//! inbound:   { "requestId", "requestTime", "directive": {...} }
//! reply:     { "requestId", "response": {...} }
//! proactive: { "request": { "event": {...}, "context": {...} } }
//! ```
//!
//! The transport delimits frames, so there is no length prefix here.

use serde::Serialize;
use thiserror::Error;

use crate::{Request, Response, ResponseBody};

/// Maximum inbound frame size (64 KiB) accepted for parsing
pub const MAX_FRAME_SIZE: usize = 64 * 1024;

/// Errors that can occur during encoding/decoding
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Frame too large: {0} bytes (max: {MAX_FRAME_SIZE})")]
    FrameTooLarge(usize),

    #[error("Malformed frame: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("JSON encode error: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Reply to a correlated request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutboundFrame<'a> {
    request_id: &'a str,
    response: &'a ResponseBody,
}

/// Device-initiated event forwarded by the relay to the event gateway
#[derive(Debug, Serialize)]
struct ProactiveFrame<'a> {
    request: &'a Response,
}

/// Decode an inbound text frame into a request
pub fn decode_request(text: &str) -> Result<Request, CodecError> {
    if text.len() > MAX_FRAME_SIZE {
        return Err(CodecError::FrameTooLarge(text.len()));
    }

    serde_json::from_str(text).map_err(CodecError::Malformed)
}

/// Wrap a response body in the correlation envelope and serialize it
pub fn encode_response(request_id: &str, response: &ResponseBody) -> Result<String, CodecError> {
    serde_json::to_string(&OutboundFrame {
        request_id,
        response,
    })
    .map_err(CodecError::Encode)
}

/// Serialize a device-initiated event (no correlation id)
pub fn encode_proactive(event: &Response) -> Result<String, CodecError> {
    serde_json::to_string(&ProactiveFrame { request: event }).map_err(CodecError::Encode)
}
