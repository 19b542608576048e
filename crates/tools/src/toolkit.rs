//! The set of data tools the agents are built from.
//!
//! [`Toolkit::from_config`] never fails. A tool whose credentials are missing
//! is replaced by an [`UnconfiguredTool`] that reports the missing key when
//! the model first calls it, so the chat surfaces can start with a partial
//! configuration.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use storewise_config::AppConfig;
use storewise_core::error::ToolError;
use storewise_core::tool::{Tool, ToolRegistry, ToolResult};
use storewise_genie::{GenieClient, GenieSpace};
use tracing::warn;

use crate::census::{CENSUS_TOOL, CensusTool, HttpCensusApi};
use crate::genie_tools::{GenieTool, PRODUCT_INVENTORY_TOOL, STORE_PERFORMANCE_TOOL};
use crate::policy::{POLICY_TOOL, PolicyTool, SqlFunctionRegistry};
use crate::research::{RESEARCH_TOOL, ResearchClient, ResearchTool};

/// Stand-in for a tool whose backend could not be set up.
pub struct UnconfiguredTool {
    name: &'static str,
    description: String,
    reason: String,
}

impl UnconfiguredTool {
    pub fn new(name: &'static str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            name,
            description: format!("Unavailable until configured ({reason})."),
            reason,
        }
    }
}

#[async_trait]
impl Tool for UnconfiguredTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        Err(ToolError::NotConfigured(self.reason.clone()))
    }
}

/// Every data tool, shared by the agents that bind them.
#[derive(Clone)]
pub struct Toolkit {
    pub store_performance: Arc<dyn Tool>,
    pub product_inventory: Arc<dyn Tool>,
    pub policy: Arc<dyn Tool>,
    pub census: Arc<dyn Tool>,
    pub research: Arc<dyn Tool>,
}

fn config_reason(err: storewise_core::Error) -> String {
    match err {
        storewise_core::Error::Config { message } => message,
        other => other.to_string(),
    }
}

/// Unwrap a built tool or fall back to a placeholder, logging why.
fn or_unconfigured(
    name: &'static str,
    built: storewise_core::Result<Arc<dyn Tool>>,
) -> Arc<dyn Tool> {
    match built {
        Ok(tool) => tool,
        Err(e) => {
            let reason = config_reason(e);
            warn!(tool = name, %reason, "Tool unavailable");
            Arc::new(UnconfiguredTool::new(name, reason))
        }
    }
}

fn genie_tool(
    config: &AppConfig,
    client: &Result<Arc<GenieClient>, String>,
    space: GenieSpace,
) -> storewise_core::Result<Arc<dyn Tool>> {
    let client = client.clone().map_err(|message| storewise_core::Error::Config { message })?;
    let space_id = storewise_genie::space_id(config, space)?;
    Ok(Arc::new(GenieTool::new(space, space_id, client)))
}

fn policy_tool(config: &AppConfig) -> storewise_core::Result<Arc<dyn Tool>> {
    let registry = SqlFunctionRegistry::new(
        config.require_databricks_host()?,
        config.require_databricks_token()?,
        config.require_warehouse_id()?,
        Duration::from_secs(config.databricks.request_timeout_secs),
    )?;
    Ok(Arc::new(PolicyTool::new(
        config.policy.function_name.clone(),
        Arc::new(registry),
    )))
}

fn census_tool(config: &AppConfig) -> storewise_core::Result<Arc<dyn Tool>> {
    let api = HttpCensusApi::new(
        &config.census.base_url,
        config.census.year,
        config.require_census_api_key()?,
    )?;
    Ok(Arc::new(CensusTool::new(Arc::new(api))))
}

fn research_tool(config: &AppConfig) -> storewise_core::Result<Arc<dyn Tool>> {
    let provider = storewise_providers::research_provider(config)?;
    let client = ResearchClient::new(Arc::new(provider), config.research.model.clone())
        .with_include_date(config.research.include_date)
        .with_timeout(config.research.request_timeout());
    Ok(Arc::new(ResearchTool::new(Arc::new(client))))
}

impl Toolkit {
    /// Build the HTTP-backed tools from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let genie = storewise_genie::client_from_config(config)
            .map(Arc::new)
            .map_err(config_reason);

        Self {
            store_performance: or_unconfigured(
                STORE_PERFORMANCE_TOOL,
                genie_tool(config, &genie, GenieSpace::StorePerformance),
            ),
            product_inventory: or_unconfigured(
                PRODUCT_INVENTORY_TOOL,
                genie_tool(config, &genie, GenieSpace::ProductInventory),
            ),
            policy: or_unconfigured(POLICY_TOOL, policy_tool(config)),
            census: or_unconfigured(CENSUS_TOOL, census_tool(config)),
            research: or_unconfigured(RESEARCH_TOOL, research_tool(config)),
        }
    }

    /// All five tools keyed by name.
    pub fn registry(&self) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        for tool in [
            &self.store_performance,
            &self.product_inventory,
            &self.policy,
            &self.census,
            &self.research,
        ] {
            registry.register(tool.clone());
        }
        registry
    }
}
