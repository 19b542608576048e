//! Shared test helpers for runner and driver tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use storewise_core::agent::AgentRole;
use storewise_core::error::{ProviderError, ToolError};
use storewise_core::message::{Message, MessageToolCall};
use storewise_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use storewise_core::tool::{Tool, ToolResult};
use storewise_tools::Toolkit;

/// A mock provider that returns a sequence of scripted responses and records
/// every request it receives.
///
/// Panics if more calls are made than responses provided.
pub struct ScriptedProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        let n = requests.len();
        if n >= responses.len() {
            panic!(
                "ScriptedProvider: no more responses (call #{n}, have {})",
                responses.len()
            );
        }
        requests.push(request);
        Ok(responses[n].clone())
    }
}

/// Create a simple text response (no tool calls).
pub fn text(content: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(content),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Create a response that calls the given tools.
pub fn calls(tool_calls: Vec<MessageToolCall>) -> ProviderResponse {
    let mut response = text("");
    response.message.tool_calls = tool_calls;
    response
}

pub fn call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: args.to_string(),
    }
}

pub fn handoff_to(role: AgentRole) -> MessageToolCall {
    let name = crate::descriptor::handoff_tool_name(role.display().name);
    call(&name, serde_json::json!({}))
}

/// What a [`StubTool`] does when called.
#[derive(Clone)]
pub enum StubBehavior {
    Reply(&'static str),
    Invalid,
    Timeout,
}

/// A data tool with a fixed name and canned behavior; counts its calls.
pub struct StubTool {
    name: &'static str,
    behavior: StubBehavior,
    calls: Mutex<Vec<serde_json::Value>>,
}

impl StubTool {
    pub fn new(name: &'static str, behavior: StubBehavior) -> Arc<Self> {
        Arc::new(Self {
            name,
            behavior,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<serde_json::Value> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Tool for StubTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "stub"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        self.calls.lock().unwrap().push(arguments);
        match self.behavior {
            StubBehavior::Reply(output) => Ok(ToolResult::ok(output)),
            StubBehavior::Invalid => Err(ToolError::InvalidArguments("state_code is required".into())),
            StubBehavior::Timeout => Err(ToolError::Timeout {
                tool_name: self.name.into(),
                timeout_secs: 60,
            }),
        }
    }
}

/// Stub versions of all five data tools, kept for call inspection.
pub struct StubKit {
    pub store_performance: Arc<StubTool>,
    pub product_inventory: Arc<StubTool>,
    pub policy: Arc<StubTool>,
    pub census: Arc<StubTool>,
    pub research: Arc<StubTool>,
}

impl StubKit {
    pub fn new() -> Self {
        Self {
            store_performance: StubTool::new(
                "get_store_performance_info",
                StubBehavior::Reply(r#"{"store":"110","city":"Baltimore","state":"MD","sales":"1250000"}"#),
            ),
            product_inventory: StubTool::new(
                "get_product_inventory_info",
                StubBehavior::Reply(r#"{"sku":"9","on_hand":"42"}"#),
            ),
            policy: StubTool::new(
                "get_business_conduct_policy_info",
                StubBehavior::Reply("Gifts over $50 must be reported."),
            ),
            census: StubTool::new(
                "get_state_census_data",
                StubBehavior::Reply("Total Population: 6,037,624"),
            ),
            research: StubTool::new("do_research_and_reason", StubBehavior::Reply("Trends are up.")),
        }
    }

    pub fn toolkit(&self) -> Toolkit {
        Toolkit {
            store_performance: self.store_performance.clone(),
            product_inventory: self.product_inventory.clone(),
            policy: self.policy.clone(),
            census: self.census.clone(),
            research: self.research.clone(),
        }
    }
}
