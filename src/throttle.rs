// ABOUTME: Rate limiter for status events so the chat UI is not flooded.
// ABOUTME: Terminal ("done") events always pass; others wait out the emit interval.

use crate::config::RelayConfig;
use crate::event::{StatusEvent, StatusLevel};
use crate::sink::StatusSink;
use anyhow::Result;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Gates how often status events reach the sink.
///
/// The timestamp sits behind a mutex that is never held across an await, so a
/// shared relay stays sound but concurrent invocations only get best-effort
/// throttling.
#[derive(Debug)]
pub struct StatusThrottle {
    enabled: bool,
    interval: Duration,
    last_emit: Mutex<Option<Instant>>,
}

impl StatusThrottle {
    pub fn new(enabled: bool, interval: Duration) -> Self {
        Self {
            enabled,
            interval,
            last_emit: Mutex::new(None),
        }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(config.status_enabled, config.emit_interval())
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the last event went out, if any
    pub fn last_emit(&self) -> Option<Instant> {
        *self.last_emit.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Send a status event if a sink is present, status is enabled, and the
    /// event is terminal or the interval has elapsed. An interval of
    /// `Duration::MAX` only lets terminal events through. Returns whether the sink
    /// was invoked. A sink error propagates and leaves the timestamp alone.
    pub async fn maybe_emit(
        &self,
        sink: Option<&dyn StatusSink>,
        level: StatusLevel,
        message: &str,
        done: bool,
    ) -> Result<bool> {
        let Some(sink) = sink else {
            return Ok(false);
        };
        if !self.enabled {
            return Ok(false);
        }

        let now = Instant::now();
        if !done && !self.interval_elapsed(now) {
            tracing::trace!(status = message, "Status event throttled");
            return Ok(false);
        }

        sink.emit(StatusEvent::new(level, message, done)).await?;

        *self.last_emit.lock().unwrap_or_else(|e| e.into_inner()) = Some(now);
        Ok(true)
    }

    fn interval_elapsed(&self, now: Instant) -> bool {
        if self.interval == Duration::MAX {
            return false;
        }
        match self.last_emit() {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        }
    }
}
