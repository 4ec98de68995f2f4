//! Response emitter - serializes replies and hands them to the transport

use crate::transport::TransportAdapter;
use anyhow::Result;
use thermolink_shared::{codec, Response, ResponseBody};
use tracing::debug;

/// Wrap `body` as `{requestId, response}` and send it as one frame
pub async fn send_response<T>(transport: &mut T, request_id: &str, body: &ResponseBody) -> Result<()>
where
    T: TransportAdapter + ?Sized,
{
    let frame = codec::encode_response(request_id, body)?;
    debug!("Sending response: {}", frame);
    transport.send_text(frame).await
}

/// Send a device-initiated event as `{request: event}`
pub async fn send_event<T>(transport: &mut T, event: &Response) -> Result<()>
where
    T: TransportAdapter + ?Sized,
{
    let frame = codec::encode_proactive(event)?;
    debug!("Sending event: {}", frame);
    transport.send_text(frame).await
}
