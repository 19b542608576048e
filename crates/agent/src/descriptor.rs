//! Immutable agent descriptors.
//!
//! A descriptor is everything the runner needs to drive one agent: its
//! instructions, model, tools and handoff targets. Descriptors reference each
//! other through `Arc`, which keeps the graph acyclic: enhanced agents embed
//! *base* agents as tools, and only the triage agent has handoffs.

use std::sync::Arc;
use storewise_core::agent::AgentRole;
use storewise_core::provider::ToolDefinition;
use storewise_core::tool::Tool;

/// Which assembly phase produced a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    /// Own-domain tools only.
    Base,
    /// Base tools plus the other specialist's base agent as a tool.
    Enhanced,
    /// The entry point; hands off instead of calling tools.
    Entry,
}

/// Another agent exposed as a callable tool.
///
/// Calling it runs the agent on a fresh transcript seeded with the `input`
/// argument and returns its final text.
pub struct AgentTool {
    pub tool_name: String,
    pub description: String,
    pub agent: Arc<AgentDescriptor>,
}

impl AgentTool {
    pub fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.tool_name.clone(),
            description: self.description.clone(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "input": {
                        "type": "string",
                        "description": "The request to pass to the agent"
                    }
                },
                "required": ["input"]
            }),
        }
    }
}

pub enum ToolBinding {
    Function(Arc<dyn Tool>),
    Agent(AgentTool),
}

impl ToolBinding {
    pub fn name(&self) -> &str {
        match self {
            ToolBinding::Function(tool) => tool.name(),
            ToolBinding::Agent(agent_tool) => &agent_tool.tool_name,
        }
    }

    pub fn to_definition(&self) -> ToolDefinition {
        match self {
            ToolBinding::Function(tool) => tool.to_definition(),
            ToolBinding::Agent(agent_tool) => agent_tool.to_definition(),
        }
    }
}

/// A one-way transfer of control to another agent.
pub struct Handoff {
    pub tool_name: String,
    pub agent: Arc<AgentDescriptor>,
}

impl Handoff {
    pub fn to(agent: Arc<AgentDescriptor>) -> Self {
        Self {
            tool_name: handoff_tool_name(&agent.name),
            agent,
        }
    }

    pub fn to_definition(&self) -> ToolDefinition {
        let mut description = format!(
            "Handoff to the {} agent to handle the request.",
            self.agent.name
        );
        if let Some(extra) = &self.agent.handoff_description {
            description.push(' ');
            description.push_str(extra);
        }
        ToolDefinition {
            name: self.tool_name.clone(),
            description,
            parameters: serde_json::json!({ "type": "object", "properties": {} }),
        }
    }
}

/// `"Enterprise Intelligence Agent"` → `"transfer_to_enterprise_intelligence_agent"`.
pub fn handoff_tool_name(agent_name: &str) -> String {
    let words: Vec<String> = agent_name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_ascii_lowercase())
        .collect();
    format!("transfer_to_{}", words.join("_"))
}

pub struct AgentDescriptor {
    pub role: AgentRole,
    pub generation: Generation,
    pub name: String,
    pub handoff_description: Option<String>,
    pub instructions: String,
    pub model: String,
    pub tools: Vec<ToolBinding>,
    pub handoffs: Vec<Handoff>,
}

impl AgentDescriptor {
    pub fn tool(&self, name: &str) -> Option<&ToolBinding> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn handoff(&self, tool_name: &str) -> Option<&Handoff> {
        self.handoffs.iter().find(|h| h.tool_name == tool_name)
    }

    /// Definitions offered to the model; handoffs only when `allow_handoffs`.
    pub fn tool_definitions(&self, allow_handoffs: bool) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> =
            self.tools.iter().map(ToolBinding::to_definition).collect();
        if allow_handoffs {
            definitions.extend(self.handoffs.iter().map(Handoff::to_definition));
        }
        definitions
    }
}

impl std::fmt::Debug for AgentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentDescriptor")
            .field("name", &self.name)
            .field("generation", &self.generation)
            .field(
                "tools",
                &self.tools.iter().map(ToolBinding::name).collect::<Vec<_>>(),
            )
            .field(
                "handoffs",
                &self
                    .handoffs
                    .iter()
                    .map(|h| h.tool_name.as_str())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
