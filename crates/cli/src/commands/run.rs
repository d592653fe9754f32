//! `daybook run` — start the bot.
//!
//! Pumps messages from the chat channel into the orchestrator. Bot
//! commands (`/start`, `/info`, `/howtouse`) are answered with canned text
//! without touching the agent; everything else goes through the full
//! gate → history → loop → persist path. A denied sender sees only the
//! static block notice while the owner's chat gets the alert.

use std::sync::Arc;

use async_trait::async_trait;
use daybook_agent::{IntrusionNotifier, Orchestrator};
use daybook_channels::{command_reply, TelegramChannel, TelegramConfig, BLOCK_NOTICE};
use daybook_core::channel::{Channel, ChannelMessage};
use daybook_core::message::SessionKey;
use tracing::{error, info, warn};

/// Delivers intrusion alerts to the owner's chat, one-way.
struct ChannelNotifier {
    channel: Arc<TelegramChannel>,
}

#[async_trait]
impl IntrusionNotifier for ChannelNotifier {
    async fn alert(&self, text: &str) {
        let chat = self.channel.alert_chat_id().to_string();
        if let Err(e) = self.channel.send(&chat, text).await {
            error!(error = %e, "Failed to deliver intrusion alert");
        }
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = daybook_config::AppConfig::load()?;
    config.validate_runtime()?;

    let channel = Arc::new(TelegramChannel::new(TelegramConfig {
        bot_token: config.channel.bot_token.clone().unwrap_or_default(),
        alert_chat_id: config.channel.alert_target().to_string(),
    }));

    let notifier = Arc::new(ChannelNotifier {
        channel: channel.clone(),
    });

    let orchestrator = super::wiring::build_orchestrator(&config, notifier).await?;

    let mut rx = channel.start().await?;
    info!("Daybook is online and listening");

    while let Some(incoming) = rx.recv().await {
        match incoming {
            Ok(msg) => {
                let orchestrator = orchestrator.clone();
                let channel = channel.clone();
                // Sessions are serialized inside the orchestrator; spawning
                // here lets different chats proceed concurrently.
                tokio::spawn(async move {
                    handle_channel_message(&orchestrator, channel.as_ref(), msg).await;
                });
            }
            Err(e) => warn!(error = %e, "Channel delivered an error"),
        }
    }

    Ok(())
}

async fn handle_channel_message(
    orchestrator: &Orchestrator,
    channel: &TelegramChannel,
    msg: ChannelMessage,
) {
    // Canned command replies bypass the agent entirely.
    if let Some(reply) = command_reply(&msg.content) {
        if let Err(e) = channel.send(&msg.chat_id, &reply).await {
            error!(error = %e, "Failed to send command reply");
        }
        return;
    }

    let _ = channel.send_typing(&msg.chat_id).await;

    let session = SessionKey::new(&msg.chat_id);
    match orchestrator
        .handle_message(&msg.sender_id, &session, &msg.content, msg.timestamp)
        .await
    {
        Ok(Some(reply)) => {
            if let Err(e) = channel.send(&msg.chat_id, &reply).await {
                error!(error = %e, "Failed to deliver reply");
            }
        }
        Ok(None) => {
            // Denied sender: static, non-informative notice only.
            if let Err(e) = channel.send(&msg.chat_id, BLOCK_NOTICE).await {
                warn!(error = %e, "Failed to send block notice");
            }
        }
        Err(e) => {
            error!(error = %e, "Message handling failed");
        }
    }
}
