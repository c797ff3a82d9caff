// ABOUTME: Failure causes of a webhook call.
// ABOUTME: All of them surface to the host as one "Error calling n8n: ..." string.

use thiserror::Error;

/// Why a webhook call did not produce a reply
#[derive(Debug, Error)]
pub enum CallError {
    /// Webhook answered with anything other than 200
    #[error("{code}: {body}")]
    Status { code: u16, body: String },

    /// Connection refused, DNS failure, timeout, body read failure
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// Body was not valid JSON
    #[error(transparent)]
    Parse(#[from] serde_json::Error),

    /// Body was JSON but not an object, so no field can be read from it
    #[error("expected a JSON object in the response body, got {0}")]
    NotAnObject(&'static str),

    /// The status sink failed while reporting completion
    #[error("{0:#}")]
    Sink(anyhow::Error),
}

impl CallError {
    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            CallError::Status { .. } => "status",
            CallError::Transport(e) if e.is_timeout() => "timeout",
            CallError::Transport(_) => "transport",
            CallError::Parse(_) | CallError::NotAnObject(_) => "parse",
            CallError::Sink(_) => "sink",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_formats_code_and_body() {
        let err = CallError::Status {
            code: 500,
            body: "server error".to_string(),
        };
        assert_eq!(err.to_string(), "500: server error");
        assert_eq!(err.kind(), "status");
    }

    #[test]
    fn test_parse_error_is_transparent() {
        let inner = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let expected = inner.to_string();
        let err = CallError::from(inner);
        assert_eq!(err.to_string(), expected);
        assert_eq!(err.kind(), "parse");
    }
}
