// ABOUTME: Callback capabilities the host passes into an invocation.
// ABOUTME: StatusSink receives progress events; InteractiveSink is accepted but unused.

use crate::event::StatusEvent;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

/// Consumes status events (e.g. renders them in the chat UI).
///
/// Errors are propagated to the relay's caller rather than swallowed.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn emit(&self, event: StatusEvent) -> Result<()>;
}

/// Request/response round-trip to the user (confirmations, inputs).
#[async_trait]
pub trait InteractiveSink: Send + Sync {
    async fn call(&self, request: Value) -> Result<Value>;
}

#[async_trait]
impl StatusSink for mpsc::Sender<StatusEvent> {
    async fn emit(&self, event: StatusEvent) -> Result<()> {
        self.send(event)
            .await
            .map_err(|_| anyhow::anyhow!("Status receiver closed"))
    }
}

#[async_trait]
impl StatusSink for mpsc::UnboundedSender<StatusEvent> {
    async fn emit(&self, event: StatusEvent) -> Result<()> {
        self.send(event)
            .map_err(|_| anyhow::anyhow!("Status receiver closed"))
    }
}
