pub mod ask;
pub mod chat;
pub mod doctor;
pub mod serve;

use std::path::Path;
use storewise_agent::SessionDriver;
use storewise_config::AppConfig;
use storewise_core::event::{EventBus, SessionEvent};

pub(crate) fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load(path).map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Build the driver for a console session, pointing at `doctor` when the
/// model endpoint is not configured.
pub(crate) fn console_driver(
    config: &AppConfig,
    session_id: &str,
) -> Result<SessionDriver, Box<dyn std::error::Error>> {
    match SessionDriver::from_config(config, EventBus::default()) {
        Ok(driver) => Ok(driver.with_session_id(session_id)),
        Err(e) => {
            eprintln!();
            eprintln!("  ERROR: {}", e.user_message());
            eprintln!("  Run `storewise doctor` to see every missing setting.");
            eprintln!();
            Err(e.into())
        }
    }
}

/// One-line progress text for the console, or `None` for events not worth
/// showing.
pub(crate) fn progress_line(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::SummarizationDetected { .. } => {
            Some("📝 Summarizing our conversation...".into())
        }
        SessionEvent::AgentStarted { agent, nested, .. } => {
            let display = agent.display();
            if *nested {
                Some(format!("  ↳ consulting {} {}...", display.icon, display.name))
            } else {
                Some(format!("{} {} is thinking...", display.icon, display.name))
            }
        }
        SessionEvent::Handoff { to, .. } => {
            Some(format!("🔄 Handing off to the {}", to.display().name))
        }
        SessionEvent::ToolStarted { tool, .. } => Some(format!("  🔧 {tool}")),
        _ => None,
    }
}

/// Print progress for `session_id` to stderr until the bus is dropped.
pub(crate) fn spawn_progress(events: &EventBus, session_id: &str) -> tokio::task::JoinHandle<()> {
    let mut rx = events.subscribe();
    let session_id = session_id.to_string();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) if event.session_id() == session_id => {
                    if let Some(line) = progress_line(&event) {
                        eprintln!("  {line}");
                    }
                }
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {}
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
