//! Channel trait — the abstraction over chat transports.
//!
//! A Channel connects Daybook to a messaging platform. It receives messages
//! from the user and sends replies back. The transport's own polling or
//! webhook machinery lives entirely behind this trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::ChannelError;

/// Unique identifier for a channel instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message received from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// The channel this message belongs to
    pub channel_id: ChannelId,

    /// Sender identifier (platform-specific user ID)
    pub sender_id: String,

    /// Human-readable sender name (if available)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,

    /// The text content
    pub content: String,

    /// The chat identifier within the channel — doubles as the session key
    pub chat_id: String,

    /// When the platform received the message
    pub timestamp: DateTime<Utc>,
}

/// The core Channel trait.
///
/// Implementations handle platform-specific connection logic and message
/// formatting (length caps, markdown quirks).
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name (e.g., "telegram", "cli").
    fn name(&self) -> &str;

    /// Unique ID for this channel instance.
    fn id(&self) -> &ChannelId;

    /// Start listening for incoming messages.
    ///
    /// Returns a receiver that yields incoming messages. The channel
    /// implementation handles polling or webhooks internally.
    async fn start(
        &self,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<ChannelMessage, ChannelError>>,
        ChannelError,
    >;

    /// Send a message to a specific chat.
    async fn send(&self, chat_id: &str, content: &str) -> std::result::Result<(), ChannelError>;

    /// Send a typing indicator (if the platform supports it).
    async fn send_typing(&self, _chat_id: &str) -> std::result::Result<(), ChannelError> {
        Ok(()) // No-op default
    }

    /// Stop the channel gracefully.
    async fn stop(&self) -> std::result::Result<(), ChannelError> {
        Ok(())
    }
}
