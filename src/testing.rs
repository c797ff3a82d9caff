// ABOUTME: Sink doubles for exercising the relay without a chat host.
// ABOUTME: RecordingSink keeps every event; FailingSink rejects them all.

use crate::event::StatusEvent;
use crate::sink::StatusSink;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Collects every status event it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<StatusEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far
    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last(&self) -> Option<StatusEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }
}

#[async_trait]
impl StatusSink for RecordingSink {
    async fn emit(&self, event: StatusEvent) -> Result<()> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
        Ok(())
    }
}

/// Fails every emission with the given message.
/// `allow` lets the first N events through before failing.
#[derive(Debug, Clone)]
pub struct FailingSink {
    message: String,
    allow: usize,
    seen: Arc<Mutex<usize>>,
}

impl FailingSink {
    pub fn new(message: &str) -> Self {
        Self::after(0, message)
    }

    pub fn after(allow: usize, message: &str) -> Self {
        Self {
            message: message.to_string(),
            allow,
            seen: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of emit calls, including failed ones
    pub fn attempts(&self) -> usize {
        *self.seen.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl StatusSink for FailingSink {
    async fn emit(&self, _event: StatusEvent) -> Result<()> {
        let attempt = {
            let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
            *seen += 1;
            *seen
        };
        if attempt > self.allow {
            anyhow::bail!("{}", self.message);
        }
        Ok(())
    }
}
