// ABOUTME: Relay configuration parsed from TOML with environment variable overrides
// ABOUTME: Every field is optional; defaults mirror the stock n8n webhook setup

use crate::paths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings for one relay instance.
///
/// Field names accept the host's original valve names as aliases, so a
/// settings blob exported from the chat host deserializes unchanged.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct RelayConfig {
    /// Webhook address the question is POSTed to
    #[serde(default = "default_endpoint_url", alias = "n8n_url")]
    pub endpoint_url: String,
    /// Sent as `Authorization: Bearer <token>`
    #[serde(default = "default_bearer_token", alias = "n8n_bearer_token")]
    pub bearer_token: String,
    /// JSON key that carries the question in the outbound body
    #[serde(default = "default_input_field")]
    pub input_field: String,
    /// JSON key read from the webhook response
    #[serde(default = "default_output_field", alias = "response_field")]
    pub output_field: String,
    /// Minimum seconds between non-terminal status events
    #[serde(default = "default_emit_interval_secs", alias = "emit_interval")]
    pub emit_interval_secs: f64,
    /// Master switch for status events
    #[serde(default = "default_true", alias = "enable_status_indicator")]
    pub status_enabled: bool,
}

// Custom Debug impl to redact the bearer token
impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("endpoint_url", &self.endpoint_url)
            .field("bearer_token", &"[REDACTED]")
            .field("input_field", &self.input_field)
            .field("output_field", &self.output_field)
            .field("emit_interval_secs", &self.emit_interval_secs)
            .field("status_enabled", &self.status_enabled)
            .finish()
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint_url(),
            bearer_token: default_bearer_token(),
            input_field: default_input_field(),
            output_field: default_output_field(),
            emit_interval_secs: default_emit_interval_secs(),
            status_enabled: default_true(),
        }
    }
}

fn default_endpoint_url() -> String {
    "http://n8n:5678/webhook/your-webhook-path".to_string()
}

fn default_bearer_token() -> String {
    "changeme".to_string()
}

fn default_input_field() -> String {
    "chatInput".to_string()
}

fn default_output_field() -> String {
    "output".to_string()
}

fn default_emit_interval_secs() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

impl RelayConfig {
    /// Throttle interval as a Duration.
    /// Zero and negative values pass every event. NaN, infinity and values
    /// beyond Duration's range saturate to `Duration::MAX`, which the throttle
    /// treats as "never emit progress".
    pub fn emit_interval(&self) -> Duration {
        let secs = self.emit_interval_secs;
        if secs.is_nan() {
            return Duration::MAX;
        }
        if secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config TOML")
    }

    /// Render as TOML with the token redacted, for display
    pub fn to_redacted_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        shown.bearer_token = "[REDACTED]".to_string();
        toml::to_string_pretty(&shown).context("Failed to serialize config")
    }

    /// Find the config file, checking multiple locations in order:
    /// 1. N8N_RELAY_CONFIG env var (if set and the file exists)
    /// 2. ./n8n-relay.toml
    /// 3. ~/.config/n8n-relay/config.toml
    fn find_config_file() -> Option<PathBuf> {
        if let Ok(env_path) = std::env::var(paths::CONFIG_PATH_ENV) {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                return Some(path);
            }
            tracing::warn!(path = %env_path, "Configured config path does not exist, ignoring");
        }

        let local_config = PathBuf::from(paths::LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        let xdg_config = paths::config_file();
        if xdg_config.exists() {
            return Some(xdg_config);
        }

        None
    }

    /// Load configuration with environment variable overrides.
    /// An explicit path skips the search and must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let found = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_config_file(),
        };

        let mut config = if let Some(config_path) = found {
            tracing::info!(path = %config_path.display(), "Loading configuration from file");
            Self::from_file(&config_path)?
        } else {
            tracing::info!("No config file found, using environment variables and defaults");
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Override fields from N8N_* environment variables
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("N8N_URL") {
            self.endpoint_url = val;
        }
        if let Ok(val) = std::env::var("N8N_BEARER_TOKEN") {
            self.bearer_token = val;
        }
        if let Ok(val) = std::env::var("N8N_INPUT_FIELD") {
            self.input_field = val;
        }
        if let Ok(val) = std::env::var("N8N_RESPONSE_FIELD") {
            self.output_field = val;
        }
        if let Ok(val) = std::env::var("N8N_EMIT_INTERVAL") {
            self.emit_interval_secs = val.trim().parse().with_context(|| {
                format!("N8N_EMIT_INTERVAL must be a number of seconds, got: {}", val)
            })?;
        }
        if let Ok(val) = std::env::var("N8N_STATUS_ENABLED") {
            self.status_enabled = parse_bool(&val).with_context(|| {
                format!("N8N_STATUS_ENABLED must be true or false, got: {}", val)
            })?;
        }
        Ok(())
    }
}

fn parse_bool(val: &str) -> Result<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("not a boolean: {}", other),
    }
}
