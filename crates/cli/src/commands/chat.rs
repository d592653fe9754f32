//! `daybook chat` — one-shot local message, no chat platform involved.
//!
//! Runs the same orchestrator path as the bot (gate included), with the
//! configured authorized identity as the sender and a local session key,
//! so multi-turn context works across invocations.

use std::sync::Arc;

use chrono::Utc;
use daybook_agent::LogOnlyNotifier;
use daybook_core::message::SessionKey;

pub async fn run(message: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = daybook_config::AppConfig::load()?;
    config.validate_runtime()?;

    let orchestrator =
        super::wiring::build_orchestrator(&config, Arc::new(LogOnlyNotifier)).await?;

    let sender = config.channel.authorized_user.clone();
    let session = SessionKey::new(format!("cli:{sender}"));

    match orchestrator
        .handle_message(&sender, &session, message, Utc::now())
        .await?
    {
        Some(reply) => println!("{reply}"),
        None => println!("(no reply — sender not authorized)"),
    }

    Ok(())
}
