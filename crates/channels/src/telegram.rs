//! Telegram channel adapter (stub).
//!
//! Implements the Channel trait for the Telegram Bot API. In production,
//! this would use `teloxide` for long-polling or webhook mode. Currently a
//! stub that can receive/send messages via an in-process channel, which
//! keeps the whole orchestrator path exercisable in tests.

use async_trait::async_trait;
use daybook_core::channel::{Channel, ChannelId, ChannelMessage};
use daybook_core::error::ChannelError;
use tokio::sync::mpsc;
use tracing::info;

use crate::text::{chunk_message, MAX_CHUNK_CHARS};

/// Telegram channel configuration.
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    pub bot_token: String,
    /// Chat id where intrusion alerts are delivered (the owner's own chat).
    pub alert_chat_id: String,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"[REDACTED]")
            .field("alert_chat_id", &self.alert_chat_id)
            .finish()
    }
}

/// Telegram channel adapter.
pub struct TelegramChannel {
    config: TelegramConfig,
    channel_id: ChannelId,
    /// Sender for injecting test messages.
    inject_tx: tokio::sync::Mutex<Option<mpsc::Sender<Result<ChannelMessage, ChannelError>>>>,
    /// Outbound log for tests: (chat_id, content).
    sent: std::sync::Mutex<Vec<(String, String)>>,
}

impl TelegramChannel {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            channel_id: ChannelId("telegram".into()),
            inject_tx: tokio::sync::Mutex::new(None),
            sent: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Inject a message as if it came from Telegram (for testing).
    pub async fn inject_message(&self, msg: ChannelMessage) -> Result<(), ChannelError> {
        let guard = self.inject_tx.lock().await;
        if let Some(tx) = guard.as_ref() {
            tx.send(Ok(msg))
                .await
                .map_err(|_| ChannelError::ConnectionLost("Message channel closed".into()))
        } else {
            Err(ChannelError::ConnectionLost("Channel not started".into()))
        }
    }

    /// The chat that receives intrusion alerts.
    pub fn alert_chat_id(&self) -> &str {
        &self.config.alert_chat_id
    }

    /// Messages sent so far (for testing).
    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn id(&self) -> &ChannelId {
        &self.channel_id
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError> {
        if self.config.bot_token.is_empty() {
            return Err(ChannelError::NotConfigured(
                "Telegram bot token is empty".into(),
            ));
        }

        info!("Telegram channel starting (stub mode)");
        let (tx, rx) = mpsc::channel(64);
        *self.inject_tx.lock().await = Some(tx);
        // In production: spawn the long-polling loop here
        Ok(rx)
    }

    async fn send(&self, chat_id: &str, content: &str) -> Result<(), ChannelError> {
        // Replies over the platform cap go out as multiple messages.
        for chunk in chunk_message(content, MAX_CHUNK_CHARS) {
            info!(
                chat_id = %chat_id,
                content_len = chunk.len(),
                "Telegram send (stub)"
            );
            // In production: call sendMessage via the Bot API
            self.sent.lock().unwrap().push((chat_id.to_string(), chunk));
        }
        Ok(())
    }

    async fn send_typing(&self, chat_id: &str) -> Result<(), ChannelError> {
        info!(chat_id = %chat_id, "Telegram typing (stub)");
        // In production: call sendChatAction with "typing"
        Ok(())
    }

    async fn stop(&self) -> Result<(), ChannelError> {
        info!("Telegram channel stopping");
        *self.inject_tx.lock().await = None;
        Ok(())
    }
}
