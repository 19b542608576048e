//! Agent identities and how they are shown to users.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three agents in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Routes each query to a specialist.
    Triage,
    /// Internal data: store performance, inventory, conduct policy.
    Enterprise,
    /// External data: census demographics, market research.
    Market,
}

/// Display name and icon for an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgentDisplay {
    pub name: &'static str,
    pub icon: &'static str,
}

impl AgentDisplay {
    /// Used when no agent ran, or the agent is unknown.
    pub const FALLBACK: AgentDisplay = AgentDisplay {
        name: "Assistant",
        icon: "🤖",
    };

    /// "{icon} {name}", the label prefixed to assistant log entries.
    pub fn label(&self) -> String {
        format!("{} {}", self.icon, self.name)
    }

    /// Display info for an optional agent, falling back to "Assistant".
    pub fn for_agent(agent: Option<AgentRole>) -> AgentDisplay {
        agent.map(AgentRole::display).unwrap_or(Self::FALLBACK)
    }
}

impl AgentRole {
    pub const ALL: [AgentRole; 3] = [AgentRole::Triage, AgentRole::Enterprise, AgentRole::Market];

    pub fn display(self) -> AgentDisplay {
        match self {
            AgentRole::Triage => AgentDisplay {
                name: "Triage Agent",
                icon: "🔀",
            },
            AgentRole::Enterprise => AgentDisplay {
                name: "Enterprise Intelligence Agent",
                icon: "📊",
            },
            AgentRole::Market => AgentDisplay {
                name: "Market Intelligence Agent",
                icon: "📈",
            },
        }
    }

    /// One line on what the agent is for, shown in the roster.
    pub fn summary(self) -> &'static str {
        match self {
            AgentRole::Triage => "Routes each question to the right specialist",
            AgentRole::Enterprise => "Store performance, inventory and conduct policy",
            AgentRole::Market => "Demographics, market trends and competitors",
        }
    }

    /// Look up a role by its display name.
    pub fn from_display_name(name: &str) -> Option<AgentRole> {
        Self::ALL.into_iter().find(|r| r.display().name == name)
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display().name)
    }
}
