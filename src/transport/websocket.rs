//! WebSocket transport to the relay, with fixed-interval reconnection

use crate::transport::traits::{TransportAdapter, TransportEvent, TransportTarget};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{sleep_until, timeout, Instant};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header::HOST, HeaderValue};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Default time allowed for TCP connect plus upgrade handshake
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Text-frame websocket client implementing [`TransportAdapter`]
pub struct WebSocketTransport {
    target: Option<TransportTarget>,
    stream: Option<WsStream>,
    /// Earliest moment the next connection attempt may start
    retry_at: Option<Instant>,
    connect_timeout: Duration,
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl WebSocketTransport {
    pub fn new() -> Self {
        Self {
            target: None,
            stream: None,
            retry_at: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Whether a socket is currently open
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn open(&self, target: &TransportTarget) -> Result<WsStream> {
        let mut request = target
            .url
            .as_str()
            .into_client_request()
            .context("Invalid target address")?;
        request.headers_mut().insert(
            HOST,
            HeaderValue::from_str(&target.host_header).context("Invalid Host header")?,
        );

        let (stream, _response) = timeout(self.connect_timeout, connect_async(request))
            .await
            .map_err(|_| anyhow!("Connect timed out after {:?}", self.connect_timeout))??;

        Ok(stream)
    }

    fn lose_connection(&mut self, reconnect_interval: Duration) {
        self.stream = None;
        self.retry_at = Some(Instant::now() + reconnect_interval);
    }
}

#[async_trait]
impl TransportAdapter for WebSocketTransport {
    fn configure(&mut self, target: TransportTarget) {
        self.target = Some(target);
    }

    async fn next_event(&mut self) -> Result<TransportEvent> {
        let target = self
            .target
            .clone()
            .ok_or_else(|| anyhow!("Transport used before being configured"))?;

        loop {
            if self.stream.is_none() {
                // Cleared only after the wait so a cancelled call keeps its backoff
                if let Some(at) = self.retry_at {
                    sleep_until(at).await;
                    self.retry_at = None;
                }

                match self.open(&target).await {
                    Ok(stream) => {
                        self.stream = Some(stream);
                        return Ok(TransportEvent::Connected);
                    }
                    Err(e) => {
                        warn!("Connect to {} failed: {:#}", target.redacted_url(), e);
                        self.retry_at = Some(Instant::now() + target.reconnect_interval);
                        continue;
                    }
                }
            }

            let message = match self.stream.as_mut() {
                Some(stream) => stream.next().await,
                None => continue,
            };

            match message {
                Some(Ok(Message::Text(text))) => return Ok(TransportEvent::Text(text)),
                Some(Ok(Message::Close(frame))) => {
                    self.lose_connection(target.reconnect_interval);
                    let reason = frame
                        .map(|f| format!("closed by peer ({}): {}", f.code, f.reason))
                        .unwrap_or_else(|| "closed by peer".into());
                    return Ok(TransportEvent::Disconnected { reason });
                }
                Some(Ok(other)) => {
                    // Pings are answered by the library on the next read/write
                    debug!("Ignoring non-text frame ({} bytes)", other.len());
                }
                Some(Err(e)) => {
                    self.lose_connection(target.reconnect_interval);
                    return Ok(TransportEvent::Disconnected {
                        reason: e.to_string(),
                    });
                }
                None => {
                    self.lose_connection(target.reconnect_interval);
                    return Ok(TransportEvent::Disconnected {
                        reason: "stream ended".into(),
                    });
                }
            }
        }
    }

    async fn send_text(&mut self, text: String) -> Result<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| anyhow!("Not connected"))?;
        stream.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            stream.close(None).await?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "WebSocket"
    }
}
