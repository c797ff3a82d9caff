// ABOUTME: Relay forwards the newest chat message to an n8n webhook and appends the reply.
// ABOUTME: One POST per invocation, no retries; every failure becomes an error reply.

use crate::config::RelayConfig;
use crate::conversation::{session_id_for, Conversation, Message, User};
use crate::error::CallError;
use crate::event::StatusLevel;
use crate::sink::{InteractiveSink, StatusSink};
use crate::throttle::StatusThrottle;
use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Hard limit on one webhook round-trip
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const CALLING_STATUS: &str = "Calling n8n workflow...";
pub const COMPLETE_STATUS: &str = "Complete";
pub const NO_MESSAGES: &str = "No messages found in the request body";
const ERROR_PREFIX: &str = "Error calling n8n: ";

/// Error object returned to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}

/// What an invocation hands back to the host: the reply text on success,
/// `{"error": ...}` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PipeResponse {
    Reply(String),
    Error(ErrorReply),
}

impl PipeResponse {
    pub fn error(message: impl Into<String>) -> Self {
        PipeResponse::Error(ErrorReply {
            error: message.into(),
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PipeResponse::Error(_))
    }

    pub fn into_result(self) -> std::result::Result<String, ErrorReply> {
        match self {
            PipeResponse::Reply(text) => Ok(text),
            PipeResponse::Error(err) => Err(err),
        }
    }
}

impl From<std::result::Result<String, ErrorReply>> for PipeResponse {
    fn from(result: std::result::Result<String, ErrorReply>) -> Self {
        match result {
            Ok(text) => PipeResponse::Reply(text),
            Err(err) => PipeResponse::Error(err),
        }
    }
}

/// Identity the host lists this pipe under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeManifest {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub name: String,
}

/// Bridges a chat conversation to one n8n webhook.
#[derive(Debug)]
pub struct Relay {
    config: RelayConfig,
    client: reqwest::Client,
    throttle: StatusThrottle,
}

impl Relay {
    pub const KIND: &'static str = "pipe";
    pub const ID: &'static str = "n8n_pipe";
    pub const NAME: &'static str = "N8N Pipe";

    pub fn new(config: RelayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(config, client))
    }

    /// Use a caller-supplied client (shared pools, custom TLS). The request
    /// timeout is still applied per call.
    pub fn with_client(config: RelayConfig, client: reqwest::Client) -> Self {
        let throttle = StatusThrottle::from_config(&config);
        Self {
            config,
            client,
            throttle,
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn throttle(&self) -> &StatusThrottle {
        &self.throttle
    }

    pub fn manifest() -> PipeManifest {
        PipeManifest {
            kind: Self::KIND.to_string(),
            id: Self::ID.to_string(),
            name: Self::NAME.to_string(),
        }
    }

    /// Send the newest message to the webhook and append its answer.
    ///
    /// Exactly one message is appended on success and when there is nothing to
    /// send; none on a failed call. `Err` only carries a status sink failure
    /// outside the webhook call itself.
    pub async fn invoke(
        &self,
        conversation: &mut Conversation,
        user: Option<&User>,
        status: Option<&dyn StatusSink>,
        _interactive: Option<&dyn InteractiveSink>,
    ) -> Result<PipeResponse> {
        self.throttle
            .maybe_emit(status, StatusLevel::Info, CALLING_STATUS, false)
            .await?;

        let Some(question) = conversation.latest_content().map(str::to_owned) else {
            tracing::warn!("Invocation without messages");
            self.throttle
                .maybe_emit(status, StatusLevel::Error, NO_MESSAGES, true)
                .await?;
            conversation.push(Message::assistant(NO_MESSAGES));
            return Ok(PipeResponse::error(NO_MESSAGES));
        };

        match self.forward(conversation, user, &question, status).await {
            Ok(reply) => Ok(PipeResponse::Reply(reply)),
            Err(e) => {
                let message = format!("{}{}", ERROR_PREFIX, e);
                tracing::warn!(
                    endpoint = %self.config.endpoint_url,
                    kind = e.kind(),
                    error = %e,
                    "Webhook call failed"
                );
                self.throttle
                    .maybe_emit(status, StatusLevel::Error, &message, true)
                    .await?;
                Ok(PipeResponse::error(message))
            }
        }
    }

    async fn forward(
        &self,
        conversation: &mut Conversation,
        user: Option<&User>,
        question: &str,
        status: Option<&dyn StatusSink>,
    ) -> std::result::Result<String, CallError> {
        let payload = self.build_payload(user, question);
        let start = std::time::Instant::now();

        tracing::debug!(
            endpoint = %self.config.endpoint_url,
            session_id = session_id_for(user),
            question_len = question.len(),
            "Calling webhook"
        );

        let response = self
            .client
            .post(&self.config.endpoint_url)
            .bearer_auth(&self.config.bearer_token)
            .header(CONTENT_TYPE, "application/json")
            .timeout(REQUEST_TIMEOUT)
            .json(&payload)
            .send()
            .await?;

        let code = response.status();
        let body = response.text().await?;

        tracing::info!(
            status = code.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Webhook responded"
        );

        if code != StatusCode::OK {
            return Err(CallError::Status {
                code: code.as_u16(),
                body,
            });
        }

        let data: Value = serde_json::from_str(&body)?;
        let reply = extract_output(&data, &self.config.output_field)?;
        conversation.push(Message::assistant(reply.clone()));

        self.throttle
            .maybe_emit(status, StatusLevel::Info, COMPLETE_STATUS, true)
            .await
            .map_err(CallError::Sink)?;

        Ok(reply)
    }

    /// Outbound body: `{"sessionId": ..., <input_field>: question}`.
    /// The question wins if the input field is itself "sessionId".
    pub fn build_payload(&self, user: Option<&User>, question: &str) -> Value {
        let mut body = Map::new();
        body.insert(
            "sessionId".to_string(),
            Value::String(session_id_for(user).to_string()),
        );
        body.insert(
            self.config.input_field.clone(),
            Value::String(question.to_string()),
        );
        Value::Object(body)
    }
}

/// Read the reply text out of a webhook response body.
/// Missing or null fields read as empty; other non-string values keep their
/// JSON rendering.
pub fn extract_output(data: &Value, field: &str) -> std::result::Result<String, CallError> {
    let object = data
        .as_object()
        .ok_or_else(|| CallError::NotAnObject(json_kind(data)))?;
    Ok(match object.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_output_variants() {
        assert_eq!(
            extract_output(&json!({"output": "hi"}), "output").unwrap(),
            "hi"
        );
        assert_eq!(extract_output(&json!({}), "output").unwrap(), "");
        assert_eq!(extract_output(&json!({"output": null}), "output").unwrap(), "");
        assert_eq!(extract_output(&json!({"output": 42}), "output").unwrap(), "42");
        assert_eq!(
            extract_output(&json!({"answer": "yes", "output": "no"}), "answer").unwrap(),
            "yes"
        );
    }

    #[test]
    fn test_extract_output_rejects_non_objects() {
        let err = extract_output(&json!([{"output": "hi"}]), "output").unwrap_err();
        assert!(matches!(err, CallError::NotAnObject("an array")));
        assert_eq!(
            err.to_string(),
            "expected a JSON object in the response body, got an array"
        );
    }

    #[test]
    fn test_build_payload_field_order_and_override() {
        let relay = Relay::with_client(RelayConfig::default(), reqwest::Client::new());
        let payload = relay.build_payload(Some(&User::with_id("u1")), "hello");
        assert_eq!(payload, json!({"sessionId": "u1", "chatInput": "hello"}));

        let relay = Relay::with_client(
            RelayConfig {
                input_field: "sessionId".to_string(),
                ..RelayConfig::default()
            },
            reqwest::Client::new(),
        );
        let payload = relay.build_payload(None, "hello");
        assert_eq!(payload, json!({"sessionId": "hello"}));
    }

    #[test]
    fn test_pipe_response_shapes() {
        let reply = PipeResponse::Reply("hi there".to_string());
        assert_eq!(serde_json::to_value(&reply).unwrap(), json!("hi there"));

        let err = PipeResponse::error("boom");
        assert_eq!(serde_json::to_value(&err).unwrap(), json!({"error": "boom"}));
        assert!(err.is_error());
        assert_eq!(
            err.into_result().unwrap_err(),
            ErrorReply {
                error: "boom".to_string()
            }
        );
    }
}
