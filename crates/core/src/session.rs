//! Per-session conversation state shared across agent runs.
//!
//! The log is append-only and order-preserving. It grows without bound for
//! the lifetime of a session; `clear()` is the only way to shrink it.

use crate::agent::AgentRole;
use serde::{Deserialize, Serialize};

/// Shown by [`SharedSessionState::formatted_history`] for an empty log.
pub const EMPTY_HISTORY: &str = "No conversation history available.";

const DEBUG_PREVIEW_CHARS: usize = 100;

/// One entry in the conversation log.
///
/// `role` is `"User"` for user turns and the agent's display name (or
/// `"Assistant"`) for replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub role: String,
    pub content: String,
}

/// The mutable state threaded through every run in one session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SharedSessionState {
    conversation_history: Vec<ConversationEntry>,
    current_agent: Option<AgentRole>,
    current_tool: Option<String>,
}

impl SharedSessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to the log.
    pub fn add_message(&mut self, role: impl Into<String>, content: impl Into<String>) {
        self.conversation_history.push(ConversationEntry {
            role: role.into(),
            content: content.into(),
        });
    }

    /// Render the log as `"role: content"` blocks separated by blank lines.
    pub fn formatted_history(&self) -> String {
        if self.conversation_history.is_empty() {
            return EMPTY_HISTORY.to_string();
        }
        self.conversation_history
            .iter()
            .map(|e| format!("{}: {}", e.role, e.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.conversation_history
    }

    pub fn len(&self) -> usize {
        self.conversation_history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversation_history.is_empty()
    }

    pub fn current_agent(&self) -> Option<AgentRole> {
        self.current_agent
    }

    pub fn set_current_agent(&mut self, agent: AgentRole) {
        self.current_agent = Some(agent);
    }

    pub fn current_tool(&self) -> Option<&str> {
        self.current_tool.as_deref()
    }

    pub fn set_current_tool(&mut self, tool: impl Into<String>) {
        self.current_tool = Some(tool.into());
    }

    /// Reset to a fresh session.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Snapshot for the `debug` console command and `/v1/session`.
    pub fn debug_view(&self) -> SessionDebugView {
        SessionDebugView {
            current_agent: self.current_agent.map(|a| a.display().name.to_string()),
            current_tool: self.current_tool.clone(),
            history_length: self.conversation_history.len(),
            entries: self
                .conversation_history
                .iter()
                .map(|e| ConversationEntry {
                    role: e.role.clone(),
                    content: truncate_preview(&e.content),
                })
                .collect(),
        }
    }
}

/// Serializable view of a session with long entries shortened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDebugView {
    pub current_agent: Option<String>,
    pub current_tool: Option<String>,
    pub history_length: usize,
    pub entries: Vec<ConversationEntry>,
}

fn truncate_preview(content: &str) -> String {
    match content.char_indices().nth(DEBUG_PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &content[..idx]),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_uses_sentinel() {
        let state = SharedSessionState::new();
        assert_eq!(state.formatted_history(), "No conversation history available.");
        assert!(state.is_empty());
    }

    #[test]
    fn formatted_history_preserves_order() {
        let mut state = SharedSessionState::new();
        state.add_message("User", "Show me store 110");
        state.add_message("Enterprise Intelligence Agent", "Store 110 sold 42 units.");
        assert_eq!(
            state.formatted_history(),
            "User: Show me store 110\n\nEnterprise Intelligence Agent: Store 110 sold 42 units."
        );
        assert_eq!(state.len(), 2);
        assert_eq!(state.entries()[0].role, "User");
    }

    #[test]
    fn clear_resets_everything() {
        let mut state = SharedSessionState::new();
        state.add_message("User", "hi");
        state.set_current_agent(AgentRole::Market);
        state.set_current_tool("get_state_census_data");
        state.clear();
        assert!(state.is_empty());
        assert!(state.current_agent().is_none());
        assert!(state.current_tool().is_none());
    }

    #[test]
    fn scalars_are_last_writer_wins() {
        let mut state = SharedSessionState::new();
        state.set_current_agent(AgentRole::Triage);
        state.set_current_agent(AgentRole::Enterprise);
        state.set_current_tool("get_store_performance_info");
        state.set_current_tool("get_market_intelligence");
        assert_eq!(state.current_agent(), Some(AgentRole::Enterprise));
        assert_eq!(state.current_tool(), Some("get_market_intelligence"));
    }

    #[test]
    fn debug_view_truncates_long_entries() {
        let mut state = SharedSessionState::new();
        state.add_message("User", "x".repeat(150));
        state.add_message("User", "short");
        state.set_current_agent(AgentRole::Enterprise);

        let view = state.debug_view();
        assert_eq!(view.history_length, 2);
        assert_eq!(view.current_agent.as_deref(), Some("Enterprise Intelligence Agent"));
        assert_eq!(view.entries[0].content.len(), 103);
        assert!(view.entries[0].content.ends_with("..."));
        assert_eq!(view.entries[1].content, "short");
    }

    #[test]
    fn debug_view_truncation_respects_char_boundaries() {
        let mut state = SharedSessionState::new();
        state.add_message("User", "📈".repeat(120));
        let view = state.debug_view();
        assert_eq!(view.entries[0].content.chars().count(), 103);
    }
}
