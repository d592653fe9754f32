//! Shared assembly: config → connected components → orchestrator.

use std::sync::Arc;

use daybook_agent::{AgentLoop, IntrusionNotifier, Orchestrator};
use daybook_calendar::CalendarClient;
use daybook_config::AppConfig;
use daybook_core::event::EventBus;
use daybook_provider::GeminiProvider;
use daybook_security::{AuditLogger, IdentityGate, TracingSink};

/// Build the orchestrator from a loaded config and a notifier.
pub async fn build_orchestrator(
    config: &AppConfig,
    notifier: Arc<dyn IntrusionNotifier>,
) -> Result<Arc<Orchestrator>, Box<dyn std::error::Error>> {
    let api_key = config
        .llm
        .api_key
        .clone()
        .ok_or("llm.api_key is not configured")?;

    let store = daybook_store::connect(&config.store.url).await?;

    let calendar = Arc::new(
        CalendarClient::new(
            &config.calendar.calendar_id,
            config.calendar.access_token.clone().unwrap_or_default(),
            config.calendar.timeout_secs,
        )
        .with_base_url(&config.calendar.api_base),
    );

    let registry = Arc::new(daybook_tools::calendar_registry(
        calendar,
        config.calendar.extra_calendars.clone(),
    ));

    let event_bus = Arc::new(EventBus::default());

    let agent = AgentLoop::new(
        Arc::new(GeminiProvider::new(api_key)),
        &config.llm.model,
        config.llm.temperature,
        registry,
        event_bus.clone(),
    )
    .with_max_tokens(config.llm.max_tokens)
    .with_max_iterations(config.agent.max_iterations);

    let audit = Arc::new(AuditLogger::with_sinks(vec![Box::new(TracingSink)]));

    Ok(Arc::new(Orchestrator::new(
        IdentityGate::new(&config.channel.authorized_user),
        store,
        agent,
        audit,
        notifier,
        event_bus,
        config.agent.history_turns,
    )))
}
