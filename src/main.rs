// ABOUTME: Command-line entry point for running the relay outside a chat host
// ABOUTME: Reads a conversation, calls the webhook, prints the host-shaped response as JSON

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use n8n_relay::{Conversation, Message, Relay, RelayConfig, StatusEvent, StatusSink, User};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "n8n-relay")]
#[command(version, about = "Relay a chat conversation to an n8n webhook", long_about = None)]
struct Cli {
    /// Config file (skips the N8N_RELAY_CONFIG / ./n8n-relay.toml / XDG search)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send the newest message of a conversation to the webhook
    Invoke {
        /// Host request body as JSON ({"messages": [...]}); "-" reads stdin
        #[arg(short, long, conflicts_with = "message")]
        input: Option<PathBuf>,

        /// Single user message to send instead of a conversation file
        #[arg(short, long)]
        message: Option<String>,

        /// User id forwarded as the webhook sessionId
        #[arg(short, long)]
        user_id: Option<String>,
    },
    /// Print the effective configuration (token redacted)
    Config,
    /// Print the pipe manifest
    Manifest,
}

/// Writes each status event as one JSON line on stderr
struct StderrSink;

#[async_trait]
impl StatusSink for StderrSink {
    async fn emit(&self, event: StatusEvent) -> Result<()> {
        let line = serde_json::to_string(&event)?;
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "{}", line)?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // stdout is reserved for the JSON response
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Manifest => {
            println!("{}", serde_json::to_string_pretty(&Relay::manifest())?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config => {
            let config = RelayConfig::load(cli.config.as_deref())?;
            print!("{}", config.to_redacted_toml()?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Invoke {
            input,
            message,
            user_id,
        } => {
            let config = RelayConfig::load(cli.config.as_deref())?;
            tracing::info!(
                endpoint = %config.endpoint_url,
                input_field = %config.input_field,
                output_field = %config.output_field,
                status_enabled = config.status_enabled,
                "Configuration loaded"
            );

            let mut conversation = match (input, message) {
                (_, Some(text)) => Conversation::new(vec![Message::user(text)]),
                (Some(path), None) => read_conversation(&path).await?,
                (None, None) => read_conversation(Path::new("-")).await?,
            };
            let user = user_id.map(User::with_id);

            let relay = Relay::new(config)?;
            let response = relay
                .invoke(&mut conversation, user.as_ref(), Some(&StderrSink), None)
                .await?;

            tracing::debug!(
                messages = conversation.len(),
                conversation = %serde_json::to_string(&conversation)?,
                "Conversation after invocation"
            );
            println!("{}", serde_json::to_string(&response)?);

            Ok(if response.is_error() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
    }
}

async fn read_conversation(path: &Path) -> Result<Conversation> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read conversation from stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&content)
        .context("Conversation must be a JSON object with a messages array")
}
