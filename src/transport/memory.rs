//! Scripted in-memory transport for exercising the protocol layer in tests

use crate::transport::traits::{TransportAdapter, TransportEvent, TransportTarget};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Replays queued events and records every frame sent
#[derive(Default)]
pub struct MemoryTransport {
    inbound: VecDeque<TransportEvent>,
    sent: Arc<Mutex<Vec<String>>>,
    target: Arc<Mutex<Option<TransportTarget>>>,
    fail_sends: bool,
}

/// Shared view of what a [`MemoryTransport`] sent and was configured with
#[derive(Clone)]
pub struct MemoryProbe {
    sent: Arc<Mutex<Vec<String>>>,
    target: Arc<Mutex<Option<TransportTarget>>>,
}

impl MemoryProbe {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    pub fn sent_json(&self) -> Vec<serde_json::Value> {
        self.sent()
            .iter()
            .map(|frame| serde_json::from_str(frame).expect("sent frame is not JSON"))
            .collect()
    }

    pub fn target(&self) -> Option<TransportTarget> {
        self.target.lock().clone()
    }
}

impl MemoryTransport {
    pub fn new(events: impl IntoIterator<Item = TransportEvent>) -> Self {
        Self {
            inbound: events.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn with_texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(texts.into_iter().map(|t| TransportEvent::Text(t.to_string())))
    }

    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    pub fn probe(&self) -> MemoryProbe {
        MemoryProbe {
            sent: self.sent.clone(),
            target: self.target.clone(),
        }
    }
}

#[async_trait]
impl TransportAdapter for MemoryTransport {
    fn configure(&mut self, target: TransportTarget) {
        *self.target.lock() = Some(target);
    }

    async fn next_event(&mut self) -> Result<TransportEvent> {
        self.inbound
            .pop_front()
            .ok_or_else(|| anyhow!("Script exhausted"))
    }

    async fn send_text(&mut self, text: String) -> Result<()> {
        if self.fail_sends {
            return Err(anyhow!("Not connected"));
        }
        self.sent.lock().push(text);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.inbound.clear();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "Memory"
    }
}
