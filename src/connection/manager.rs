//! Connection manager - binds the transport to the message router

use crate::directive::{emitter, DirectiveHandler, MessageRouter, Session};
use crate::transport::{TransportAdapter, TransportEvent, TransportTarget};
use anyhow::{Context, Result};
use std::time::Duration;
use thermolink_shared::{protocol, LocalChange};
use tracing::{debug, error, info, warn};
use url::Url;

/// Relay host used by deployed devices
pub const DEFAULT_HOST: &str = "alexa.iot.oz.nu";

/// Configuration for the relay connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    /// Use `wss://`; requires the `tls` feature
    pub use_tls: bool,
    /// Fixed `Host` header sent with the upgrade request
    pub host_header: String,
    /// Fixed delay between reconnect attempts
    pub reconnect_interval: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        let use_tls = cfg!(feature = "tls");
        Self {
            host: DEFAULT_HOST.into(),
            port: if use_tls { 443 } else { 80 },
            use_tls,
            host_header: DEFAULT_HOST.into(),
            reconnect_interval: Duration::from_millis(protocol::RECONNECT_INTERVAL_MS),
        }
    }
}

impl ConnectionConfig {
    /// Build the transport target, authentication carried as query parameters
    pub fn target(&self, client_id: &str, client_token: &str, device_id: &str) -> Result<TransportTarget> {
        let scheme = if self.use_tls { "wss" } else { "ws" };
        let mut url = Url::parse(&format!("{}://{}:{}/", scheme, self.host, self.port))
            .with_context(|| format!("Invalid relay address {}:{}", self.host, self.port))?;
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("client_token", client_token)
            .append_pair("device_id", device_id);

        Ok(TransportTarget {
            url,
            host_header: self.host_header.clone(),
            reconnect_interval: self.reconnect_interval,
        })
    }
}

/// Connection status as last reported by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

/// Services one transport for one device
pub struct ConnectionManager<T, H> {
    transport: T,
    router: MessageRouter<H>,
    session: Session,
    status: ConnectionStatus,
}

impl<T: TransportAdapter, H: DirectiveHandler> ConnectionManager<T, H> {
    /// Configure `transport` for this device and register `handler`
    pub fn connect(
        mut transport: T,
        config: &ConnectionConfig,
        client_id: &str,
        client_token: &str,
        device_id: &str,
        handler: H,
    ) -> Result<Self> {
        let target = config.target(client_id, client_token, device_id)?;

        info!("Starting connection via {}", transport.name());
        info!("  Relay: {}", target.redacted_url());
        info!("  Client ID: {}", client_id);
        info!("  Device ID: {}", device_id);

        transport.configure(target);

        Ok(Self {
            transport,
            router: MessageRouter::new(handler),
            session: Session::new(device_id),
            status: ConnectionStatus::Connecting,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn handler(&self) -> &H {
        self.router.handler()
    }

    pub fn handler_mut(&mut self) -> &mut H {
        self.router.handler_mut()
    }

    /// Wait for the next transport event
    ///
    /// Only waits on the transport, so it can sit in a `select!` next to
    /// other event sources; pass the result to [`service`](Self::service).
    pub async fn next_event(&mut self) -> Result<TransportEvent> {
        self.transport.next_event().await
    }

    /// Handle one transport event to completion
    pub async fn service(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => {
                info!("Connected to relay");
                self.status = ConnectionStatus::Connected;
            }
            TransportEvent::Disconnected { reason } => {
                warn!("Disconnected from relay: {}", reason);
                self.status = ConnectionStatus::Disconnected;
            }
            TransportEvent::Text(text) => self.handle_text(&text).await,
        }
    }

    /// Service the transport once; returns `false` once it has shut down
    pub async fn poll(&mut self) -> bool {
        match self.next_event().await {
            Ok(event) => {
                self.service(event).await;
                true
            }
            Err(e) => {
                error!("Transport closed: {:#}", e);
                false
            }
        }
    }

    /// Service the transport until it shuts down
    pub async fn run(&mut self) {
        while self.poll().await {}
    }

    /// Report a change made at the device; returns whether an event was sent
    pub async fn report_change(&mut self, change: LocalChange) -> Result<bool> {
        let Some(event) = self
            .router
            .handler_mut()
            .handle_local_change(&self.session, change)
        else {
            debug!("Local change {:?} left state unchanged", change);
            return Ok(false);
        };

        emitter::send_event(&mut self.transport, &event).await?;
        Ok(true)
    }

    /// Close the transport gracefully
    pub async fn close(&mut self) -> Result<()> {
        self.transport.close().await
    }

    async fn handle_text(&mut self, text: &str) {
        debug!("Incoming frame: {}", text);

        let Some(routed) = self.router.route_message(&self.session, text) else {
            return;
        };

        if let Err(e) =
            emitter::send_response(&mut self.transport, &routed.request_id, &routed.body).await
        {
            error!("Failed to send response for {}: {:#}", routed.request_id, e);
        }
    }
}
