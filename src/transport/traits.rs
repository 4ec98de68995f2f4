//! Transport trait abstraction for pluggable socket backends

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Lifecycle and data events surfaced by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Socket (re)established
    Connected,
    /// Socket lost; the adapter reconnects on its own
    Disconnected { reason: String },
    /// One inbound text frame, unmodified
    Text(String),
}

/// Where and how a transport connects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportTarget {
    /// Full target address, authentication carried as query parameters
    pub url: Url,
    /// Value of the fixed `Host` header sent with the upgrade request
    pub host_header: String,
    /// Fixed delay between reconnect attempts
    pub reconnect_interval: Duration,
}

impl TransportTarget {
    /// The target address with the client token masked, for logging
    pub fn redacted_url(&self) -> String {
        let mut url = self.url.clone();
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .map(|(k, v)| {
                let v = if k == "client_token" { "***".into() } else { v.into_owned() };
                (k.into_owned(), v)
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
        url.to_string()
    }
}

/// A persistent, self-reconnecting text-frame transport
#[async_trait]
pub trait TransportAdapter: Send {
    /// Set the target; takes effect on the next connection attempt
    fn configure(&mut self, target: TransportTarget);

    /// Wait for the next transport event, connecting or reconnecting as needed
    ///
    /// Returns an error only when the transport cannot continue at all.
    async fn next_event(&mut self) -> Result<TransportEvent>;

    /// Submit one outbound text frame
    async fn send_text(&mut self, text: String) -> Result<()>;

    /// Close the transport gracefully
    async fn close(&mut self) -> Result<()>;

    /// Human-readable name for this transport
    fn name(&self) -> &'static str;
}
