// ABOUTME: Status events handed to the host's status sink during an invocation.
// ABOUTME: Serializes into the host's {"type":"status","data":{...}} envelope.

use serde::{Deserialize, Serialize};

/// Severity of a status event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Info,
    Error,
}

/// Progress notification for the chat UI.
///
/// `done` marks the last event of an invocation; the throttle never drops
/// those.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Envelope", try_from = "Envelope")]
pub struct StatusEvent {
    pub level: StatusLevel,
    pub message: String,
    pub done: bool,
}

impl StatusEvent {
    pub fn new(level: StatusLevel, message: impl Into<String>, done: bool) -> Self {
        Self {
            level,
            message: message.into(),
            done,
        }
    }

    pub fn info(message: impl Into<String>, done: bool) -> Self {
        Self::new(StatusLevel::Info, message, done)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(StatusLevel::Error, message, true)
    }

    /// Progress state shown by the host: complete once `done` is set
    pub fn progress(&self) -> Progress {
        if self.done {
            Progress::Complete
        } else {
            Progress::InProgress
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Progress {
    InProgress,
    Complete,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
enum Envelope {
    Status(StatusData),
}

#[derive(Serialize, Deserialize)]
struct StatusData {
    status: Progress,
    level: StatusLevel,
    description: String,
    done: bool,
}

impl From<StatusEvent> for Envelope {
    fn from(event: StatusEvent) -> Self {
        Envelope::Status(StatusData {
            status: event.progress(),
            level: event.level,
            description: event.message,
            done: event.done,
        })
    }
}

impl TryFrom<Envelope> for StatusEvent {
    type Error = String;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        let Envelope::Status(data) = envelope;
        if (data.status == Progress::Complete) != data.done {
            return Err(format!(
                "status {:?} disagrees with done={}",
                data.status, data.done
            ));
        }
        Ok(StatusEvent {
            level: data.level,
            message: data.description,
            done: data.done,
        })
    }
}
