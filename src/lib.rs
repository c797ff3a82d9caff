// ABOUTME: Chat-to-n8n relay: forwards the newest message to a webhook and appends the reply.
// ABOUTME: Exposes the relay, its status throttle, config loading, and host-facing types.

pub mod config;
pub mod conversation;
pub mod error;
pub mod event;
pub mod paths;
pub mod relay;
pub mod sink;
pub mod testing;
pub mod throttle;

pub use config::RelayConfig;
pub use conversation::{Conversation, Message, Role, User};
pub use error::CallError;
pub use event::{Progress, StatusEvent, StatusLevel};
pub use relay::{ErrorReply, PipeManifest, PipeResponse, Relay};
pub use sink::{InteractiveSink, StatusSink};
pub use throttle::StatusThrottle;
