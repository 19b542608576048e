//! Two-phase assembly of the agent graph.
//!
//! 1. Base specialists with their own-domain tools.
//! 2. Enhanced specialists: base tools plus the *other* domain's base agent
//!    as a tool, with the "Additional Capabilities" addendum appended.
//! 3. Triage, with handoffs to the enhanced specialists.
//!
//! Because enhanced agents only ever embed base agents, the graph has no
//! cycles and a nested call can never recurse further.

use std::sync::Arc;
use storewise_core::agent::AgentRole;
use storewise_tools::Toolkit;

use crate::descriptor::{AgentDescriptor, AgentTool, Generation, Handoff, ToolBinding};
use crate::prompts;

pub const MARKET_INTELLIGENCE_TOOL: &str = "get_market_intelligence";
pub const ENTERPRISE_DATA_TOOL: &str = "get_enterprise_data";

/// The five descriptors of the assembled system.
#[derive(Debug, Clone)]
pub struct AgentSystem {
    pub triage: Arc<AgentDescriptor>,
    pub enterprise: Arc<AgentDescriptor>,
    pub market: Arc<AgentDescriptor>,
    pub base_enterprise: Arc<AgentDescriptor>,
    pub base_market: Arc<AgentDescriptor>,
}

fn enterprise_tools(toolkit: &Toolkit) -> Vec<ToolBinding> {
    vec![
        ToolBinding::Function(toolkit.policy.clone()),
        ToolBinding::Function(toolkit.store_performance.clone()),
        ToolBinding::Function(toolkit.product_inventory.clone()),
    ]
}

fn market_tools(toolkit: &Toolkit) -> Vec<ToolBinding> {
    vec![
        ToolBinding::Function(toolkit.census.clone()),
        ToolBinding::Function(toolkit.research.clone()),
    ]
}

fn specialist(
    role: AgentRole,
    generation: Generation,
    model: &str,
    instructions: String,
    handoff_description: &str,
    tools: Vec<ToolBinding>,
) -> Arc<AgentDescriptor> {
    Arc::new(AgentDescriptor {
        role,
        generation,
        name: role.display().name.to_string(),
        handoff_description: Some(handoff_description.to_string()),
        instructions,
        model: model.to_string(),
        tools,
        handoffs: vec![],
    })
}

impl AgentSystem {
    pub fn build(model: &str, toolkit: &Toolkit) -> Self {
        let base_enterprise = specialist(
            AgentRole::Enterprise,
            Generation::Base,
            model,
            prompts::ENTERPRISE.to_string(),
            prompts::ENTERPRISE_HANDOFF,
            enterprise_tools(toolkit),
        );
        let base_market = specialist(
            AgentRole::Market,
            Generation::Base,
            model,
            prompts::MARKET.to_string(),
            prompts::MARKET_HANDOFF,
            market_tools(toolkit),
        );

        let mut tools = enterprise_tools(toolkit);
        tools.push(ToolBinding::Agent(AgentTool {
            tool_name: MARKET_INTELLIGENCE_TOOL.into(),
            description: prompts::MARKET_AS_TOOL.into(),
            agent: base_market.clone(),
        }));
        let enterprise = specialist(
            AgentRole::Enterprise,
            Generation::Enhanced,
            model,
            format!("{}{}", prompts::ENTERPRISE, prompts::ENTERPRISE_ADDENDUM),
            prompts::ENTERPRISE_HANDOFF,
            tools,
        );

        let mut tools = market_tools(toolkit);
        tools.push(ToolBinding::Agent(AgentTool {
            tool_name: ENTERPRISE_DATA_TOOL.into(),
            description: prompts::ENTERPRISE_AS_TOOL.into(),
            agent: base_enterprise.clone(),
        }));
        let market = specialist(
            AgentRole::Market,
            Generation::Enhanced,
            model,
            format!("{}{}", prompts::MARKET, prompts::MARKET_ADDENDUM),
            prompts::MARKET_HANDOFF,
            tools,
        );

        let triage = Arc::new(AgentDescriptor {
            role: AgentRole::Triage,
            generation: Generation::Entry,
            name: AgentRole::Triage.display().name.to_string(),
            handoff_description: None,
            instructions: prompts::TRIAGE.to_string(),
            model: model.to_string(),
            tools: vec![],
            handoffs: vec![Handoff::to(enterprise.clone()), Handoff::to(market.clone())],
        });

        Self {
            triage,
            enterprise,
            market,
            base_enterprise,
            base_market,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storewise_config::AppConfig;

    fn system() -> AgentSystem {
        AgentSystem::build("test-model", &Toolkit::from_config(&AppConfig::default()))
    }

    fn tool_names(agent: &AgentDescriptor) -> Vec<&str> {
        agent.tools.iter().map(ToolBinding::name).collect()
    }

    #[test]
    fn base_agents_have_only_domain_tools() {
        let system = system();
        assert_eq!(
            tool_names(&system.base_enterprise),
            vec![
                "get_business_conduct_policy_info",
                "get_store_performance_info",
                "get_product_inventory_info",
            ]
        );
        assert_eq!(
            tool_names(&system.base_market),
            vec!["get_state_census_data", "do_research_and_reason"]
        );
        assert_eq!(system.base_market.generation, Generation::Base);
        assert!(!system.base_enterprise.instructions.contains("Additional Capabilities"));
    }

    #[test]
    fn enhanced_agents_embed_the_other_base_agent() {
        let system = system();

        let Some(ToolBinding::Agent(market_tool)) = system.enterprise.tool(MARKET_INTELLIGENCE_TOOL)
        else {
            panic!("enhanced enterprise agent is missing get_market_intelligence");
        };
        assert!(Arc::ptr_eq(&market_tool.agent, &system.base_market));

        let Some(ToolBinding::Agent(enterprise_tool)) = system.market.tool(ENTERPRISE_DATA_TOOL)
        else {
            panic!("enhanced market agent is missing get_enterprise_data");
        };
        assert!(Arc::ptr_eq(&enterprise_tool.agent, &system.base_enterprise));

        assert_eq!(system.enterprise.tools.len(), 4);
        assert_eq!(system.market.tools.len(), 3);
        assert!(system.market.instructions.ends_with("using your tools"));
        assert!(system.enterprise.instructions.contains("## Additional Capabilities"));
    }

    #[test]
    fn triage_hands_off_to_enhanced_agents() {
        let system = system();
        let triage = &system.triage;

        assert_eq!(triage.generation, Generation::Entry);
        assert!(triage.tools.is_empty());
        let targets: Vec<&str> = triage.handoffs.iter().map(|h| h.tool_name.as_str()).collect();
        assert_eq!(
            targets,
            vec![
                "transfer_to_enterprise_intelligence_agent",
                "transfer_to_market_intelligence_agent",
            ]
        );
        assert!(Arc::ptr_eq(&triage.handoffs[0].agent, &system.enterprise));
        assert!(Arc::ptr_eq(&triage.handoffs[1].agent, &system.market));
    }

    #[test]
    fn base_agents_have_no_handoffs() {
        let system = system();
        for agent in [
            &system.base_enterprise,
            &system.base_market,
            &system.enterprise,
            &system.market,
        ] {
            assert!(agent.handoffs.is_empty(), "{} has handoffs", agent.name);
            assert_eq!(agent.model, "test-model");
        }
    }
}
