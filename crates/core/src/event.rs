//! Session events for decoupled progress reporting.
//!
//! The runner and session driver publish events as a query moves through
//! agents and tools. Surfaces (the CLI spinner, the gateway's SSE feed)
//! subscribe without the runtime knowing about them. Events never touch the
//! conversation log.

use crate::agent::AgentRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Everything observable about one query's lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    QueryStarted {
        session_id: String,
        query: String,
        timestamp: DateTime<Utc>,
    },

    /// The query asked for a recap; it will go straight to triage with
    /// handoffs disabled.
    SummarizationDetected { session_id: String },

    AgentStarted {
        session_id: String,
        agent: AgentRole,
        /// True when the agent runs as a tool inside another agent.
        nested: bool,
    },

    AgentEnded {
        session_id: String,
        agent: AgentRole,
        duration_ms: u64,
    },

    ToolStarted { session_id: String, tool: String },

    ToolEnded {
        session_id: String,
        tool: String,
        success: bool,
        duration_ms: u64,
    },

    Handoff {
        session_id: String,
        from: AgentRole,
        to: AgentRole,
    },

    QueryCompleted {
        session_id: String,
        agent_label: String,
        timestamp: DateTime<Utc>,
    },

    QueryFailed {
        session_id: String,
        error: String,
        timestamp: DateTime<Utc>,
    },
}

impl SessionEvent {
    pub fn session_id(&self) -> &str {
        match self {
            SessionEvent::QueryStarted { session_id, .. }
            | SessionEvent::SummarizationDetected { session_id }
            | SessionEvent::AgentStarted { session_id, .. }
            | SessionEvent::AgentEnded { session_id, .. }
            | SessionEvent::ToolStarted { session_id, .. }
            | SessionEvent::ToolEnded { session_id, .. }
            | SessionEvent::Handoff { session_id, .. }
            | SessionEvent::QueryCompleted { session_id, .. }
            | SessionEvent::QueryFailed { session_id, .. } => session_id,
        }
    }

    /// The serialized `type` tag, used as the SSE event name.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::QueryStarted { .. } => "query_started",
            SessionEvent::SummarizationDetected { .. } => "summarization_detected",
            SessionEvent::AgentStarted { .. } => "agent_started",
            SessionEvent::AgentEnded { .. } => "agent_ended",
            SessionEvent::ToolStarted { .. } => "tool_started",
            SessionEvent::ToolEnded { .. } => "tool_ended",
            SessionEvent::Handoff { .. } => "handoff",
            SessionEvent::QueryCompleted { .. } => "query_completed",
            SessionEvent::QueryFailed { .. } => "query_failed",
        }
    }
}

/// A broadcast-based event bus for session events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub. Slow
/// subscribers lag and drop events rather than blocking the publisher.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Arc<SessionEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: SessionEvent) {
        // no subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<SessionEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(SessionEvent::ToolEnded {
            session_id: "default".into(),
            tool: "get_state_census_data".into(),
            success: true,
            duration_ms: 42,
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            SessionEvent::ToolEnded { tool, success, .. } => {
                assert_eq!(tool, "get_state_census_data");
                assert!(success);
            }
            _ => panic!("Expected ToolEnded event"),
        }
        assert_eq!(event.session_id(), "default");
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(SessionEvent::QueryFailed {
            session_id: "s".into(),
            error: "no subscribers".into(),
            timestamp: Utc::now(),
        });
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = SessionEvent::Handoff {
            session_id: "s".into(),
            from: AgentRole::Triage,
            to: AgentRole::Market,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "handoff");
        assert_eq!(json["to"], "market");
        assert_eq!(json["type"], event.kind());

        let event = SessionEvent::SummarizationDetected { session_id: "s".into() };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.kind());
    }
}
